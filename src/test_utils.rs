use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use migration::MigratorTrait;
use sea_orm::SqlxSqliteConnector;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::database::Database;

/// Number of pre-opened connections per test database. Acquires that find an
/// idle connection complete synchronously, which keeps the pool's acquire
/// timeout from ever registering a tokio timer — under `start_paused` tests
/// tokio would auto-advance straight to that timeout while the sqlite worker
/// thread is still responding.
const TEST_POOL_SIZE: u32 = 8;

static TEST_DB_ID: AtomicU64 = AtomicU64::new(0);

pub async fn test_db() -> Arc<Database> {
    // A named shared-cache in-memory database so every pooled connection
    // sees the same data. Each test gets its own name.
    let id = TEST_DB_ID.fetch_add(1, Ordering::Relaxed);

    // Connect and migrate on a separate thread with its own runtime: the
    // paused clock of `start_paused` tests would otherwise race the pool's
    // acquire timeout during connection setup.
    let conn = tokio::task::spawn_blocking(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let url =
                format!("sqlite:file:spotify_mirror_test_{id}?mode=memory&cache=shared");
            let opt = SqliteConnectOptions::from_str(&url)
                .unwrap()
                .foreign_keys(true);

            let pool = SqlitePoolOptions::new()
                .max_connections(TEST_POOL_SIZE)
                .test_before_acquire(false)
                .connect_with(opt)
                .await
                .unwrap();

            // Pre-open every connection so the pool never has to dial a new
            // one (another paused-clock hazard) once the test is running.
            let mut warm = Vec::new();
            for _ in 0..TEST_POOL_SIZE {
                warm.push(pool.acquire().await.unwrap());
            }
            drop(warm);

            let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

            migration::Migrator::up(&conn, None).await.unwrap();

            // Connections are returned to the pool by spawned tasks; wait
            // for all of them to land before this runtime is dropped, or
            // the in-flight connections are destroyed with it.
            while conn.get_sqlite_connection_pool().num_idle() < TEST_POOL_SIZE as usize {
                tokio::task::yield_now().await;
            }

            conn
        })
    })
    .await
    .unwrap();

    // Keep the runtime busy whenever a connection is checked out or being
    // returned to the pool. Tokio's paused clock auto-advances the moment
    // the runtime idles, which would fire acquire timeouts (and jump over
    // rate-limit sleeps) while the sqlite worker thread is still replying;
    // spinning here means virtual time only moves when the pool is quiet.
    let pool = conn.get_sqlite_connection_pool().clone();
    tokio::spawn(async move {
        loop {
            while (pool.num_idle() as u32) < pool.size() {
                tokio::task::yield_now().await;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    });

    Arc::new(Database { conn })
}
