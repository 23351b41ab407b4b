use color_eyre::Result;
use serde::Serialize;

use crate::entities::sync_log;
use crate::store::Store;
use crate::sync::orchestrator::RunRegistry;
use crate::sync::progress::{self, RunningSyncProgress};

const RECENT_SYNCS_SHOWN: u64 = 5;

/// Status snapshot for the CLI and any polling caller.
#[derive(Debug, Serialize)]
pub struct SyncStatus {
    pub is_running: bool,
    pub last_sync: Option<sync_log::Model>,
    pub current_progress: Option<RunningSyncProgress>,
    pub recent_syncs: Vec<sync_log::Model>,
}

/// Read-only view over the sync tables. Needs no API client; a process that
/// is not running the sync itself passes an empty registry and gets a purely
/// database-derived answer.
pub struct StatusReader {
    store: Store,
    registry: RunRegistry,
}

impl StatusReader {
    pub fn new(store: Store, registry: RunRegistry) -> Self {
        Self { store, registry }
    }

    pub async fn get_sync_status(&self) -> Result<SyncStatus> {
        let last_sync = self.store.latest_sync_log().await?;
        let current_progress = self.get_latest_running_sync_with_progress().await?;
        let recent_syncs = self.store.recent_sync_logs(RECENT_SYNCS_SHOWN).await?;

        Ok(SyncStatus {
            is_running: self.registry.is_running() || current_progress.is_some(),
            last_sync,
            current_progress,
            recent_syncs,
        })
    }

    pub async fn get_latest_running_sync_with_progress(
        &self,
    ) -> Result<Option<RunningSyncProgress>> {
        let Some(log) = self.store.latest_running_sync().await? else {
            return Ok(None);
        };

        let steps = self.store.sync_progress_for(log.id).await?;
        let now = chrono::Utc::now().timestamp();

        Ok(Some(progress::compute(&log, &steps, now)))
    }
}
