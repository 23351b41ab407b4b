use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::{error, info, warn};

use crate::entities::sync_log;
use crate::ports::credentials::CredentialsProvider;
use crate::ports::spotify::SpotifyClient;
use crate::store::{Store, SyncTotals};
use crate::sync::artists::run_artist_phase;
use crate::sync::audio_features::run_audio_features_phase;
use crate::sync::dump::DumpRecorder;
use crate::sync::playlists::run_playlist_phase;
use crate::sync::writer::LibraryWriter;

pub const SYNC_TYPE_PLAYLISTS: &str = "playlists";

/// In-process set of sync runs currently executing, for status queries that
/// must not count a run some other process abandoned.
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<Mutex<HashSet<i64>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, sync_log_id: i64) {
        if let Ok(mut runs) = self.runs.lock() {
            runs.insert(sync_log_id);
        }
    }

    fn deregister(&self, sync_log_id: i64) {
        if let Ok(mut runs) = self.runs.lock() {
            runs.remove(&sync_log_id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.runs.lock().map(|runs| !runs.is_empty()).unwrap_or(false)
    }
}

/// Drives a full sync: playlists, then artist enrichment, then audio
/// features, with one sync_log row bracketing the run.
pub struct SyncEngine<C, P> {
    store: Store,
    client: C,
    credentials: P,
    recorder: DumpRecorder,
    registry: RunRegistry,
}

impl<C: SpotifyClient, P: CredentialsProvider> SyncEngine<C, P> {
    pub fn new(store: Store, client: C, credentials: P, recorder: DumpRecorder) -> Self {
        Self {
            store,
            client,
            credentials,
            recorder,
            registry: RunRegistry::new(),
        }
    }

    /// Run a full sync. Returns the sync_log id on success; on failure the
    /// log row is marked failed before the error propagates.
    pub async fn run_sync(&self) -> Result<i64> {
        let credentials = self
            .credentials
            .get_credentials()
            .await?
            .ok_or_else(|| eyre!("Spotify account is not linked"))?;

        if credentials.access_token.is_none() {
            return Err(eyre!("No access token stored, run the auth flow first"));
        }

        let log = self.store.create_sync_log(SYNC_TYPE_PLAYLISTS).await?;
        info!(sync_log_id = log.id, "Starting sync");

        self.registry.register(log.id);
        let result = self.run_phases(log.id).await;
        self.registry.deregister(log.id);

        match result {
            Ok(totals) => {
                self.store
                    .complete_sync_log(log.id, sync_log::STATUS_SUCCESS, None, Some(totals))
                    .await?;
                info!(sync_log_id = log.id, "Sync complete");
                Ok(log.id)
            }
            Err(run_error) => {
                error!(sync_log_id = log.id, ?run_error, "Sync failed");
                if let Err(log_error) = self
                    .store
                    .complete_sync_log(
                        log.id,
                        sync_log::STATUS_FAILED,
                        Some(format!("{run_error:#}")),
                        None,
                    )
                    .await
                {
                    warn!(sync_log_id = log.id, ?log_error, "Failed to mark sync as failed");
                }
                Err(run_error)
            }
        }
    }

    async fn run_phases(&self, sync_log_id: i64) -> Result<SyncTotals> {
        let writer = LibraryWriter::new(self.store.clone());

        let playlists =
            run_playlist_phase(&self.client, &writer, &self.recorder, sync_log_id).await?;

        // Token may have been revoked mid-run; the enrichment phases need it
        // as much as phase 1 did.
        let still_linked = self
            .credentials
            .get_credentials()
            .await?
            .is_some_and(|credentials| credentials.access_token.is_some());
        if !still_linked {
            return Err(eyre!("Access token disappeared during sync"));
        }

        let artists = run_artist_phase(&self.client, &writer, &self.recorder, sync_log_id).await?;

        let features =
            run_audio_features_phase(&self.client, &writer, &self.recorder, sync_log_id).await?;

        if !features.available {
            info!(
                failed = features.failed,
                "Audio features unavailable for this app, continuing without them"
            );
        }

        info!(
            playlists = playlists.seen,
            artists_enriched = artists.processed,
            features_fetched = features.processed,
            "All sync phases finished"
        );

        Ok(SyncTotals {
            synced: playlists.seen as i32,
            added: playlists.added as i32,
            updated: playlists.updated as i32,
        })
    }
}
