use serde::Serialize;

use crate::entities::{sync_log, sync_progress};

/// A run older than this is probably wedged; surfaced as a warning in status
/// output rather than acted on.
pub const SYNC_TIMEOUT_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Serialize)]
pub struct StepProgress {
    pub step: String,
    pub total_items: i64,
    pub processed_items: i64,
    pub failed_items: i64,
    pub progress_percent: u8,
    pub completed: bool,
    pub started_at: i64,
}

/// Point-in-time view of a running sync, aggregated over its per-phase
/// counters.
#[derive(Debug, Clone, Serialize)]
pub struct RunningSyncProgress {
    pub sync_log_id: i64,
    pub sync_type: String,
    pub progress_percent: u8,
    pub total_items: i64,
    pub processed_items: i64,
    pub failed_items: i64,
    pub elapsed_seconds: i64,
    /// None until at least one item has been processed.
    pub eta_seconds: Option<i64>,
    pub timeout_warning: bool,
    pub steps: Vec<StepProgress>,
}

fn percent(processed: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    ((processed * 100) / total).clamp(0, 100) as u8
}

/// Aggregate a run's step counters into an overall progress view. ETA is a
/// straight-line projection of the observed rate, so it only exists once some
/// work has actually happened.
pub fn compute(
    log: &sync_log::Model,
    steps: &[sync_progress::Model],
    now: i64,
) -> RunningSyncProgress {
    let total_items: i64 = steps.iter().map(|step| step.total_items).sum();
    let processed_items: i64 = steps.iter().map(|step| step.processed_items).sum();
    let failed_items: i64 = steps.iter().map(|step| step.failed_items).sum();

    let elapsed_seconds = (now - log.started_at).max(0);

    let eta_seconds = if processed_items > 0 && elapsed_seconds > 0 {
        let remaining = (total_items - processed_items).max(0);
        let rate = processed_items as f64 / elapsed_seconds as f64;
        Some((remaining as f64 / rate).ceil() as i64)
    } else {
        None
    };

    RunningSyncProgress {
        sync_log_id: log.id,
        sync_type: log.sync_type.clone(),
        progress_percent: percent(processed_items, total_items),
        total_items,
        processed_items,
        failed_items,
        elapsed_seconds,
        eta_seconds,
        timeout_warning: elapsed_seconds > SYNC_TIMEOUT_SECONDS,
        steps: steps
            .iter()
            .map(|step| StepProgress {
                step: step.step.clone(),
                total_items: step.total_items,
                processed_items: step.processed_items,
                failed_items: step.failed_items,
                progress_percent: percent(step.processed_items, step.total_items),
                completed: step.completed_at.is_some(),
                started_at: step.started_at,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(started_at: i64) -> sync_log::Model {
        sync_log::Model {
            id: 7,
            sync_type: "playlists".to_string(),
            started_at,
            completed_at: None,
            status: sync_log::STATUS_RUNNING.to_string(),
            error: None,
            items_synced: None,
            items_added: None,
            items_updated: None,
        }
    }

    fn step(name: &str, total: i64, processed: i64, failed: i64) -> sync_progress::Model {
        sync_progress::Model {
            sync_log_id: 7,
            step: name.to_string(),
            total_items: total,
            processed_items: processed,
            failed_items: failed,
            started_at: 1000,
            updated_at: 1000,
            completed_at: None,
        }
    }

    #[test]
    fn test_percent_is_floor_of_ratio() {
        let progress = compute(&log(1000), &[step("artists", 3, 1, 0)], 1010);
        assert_eq!(progress.progress_percent, 33);
    }

    #[test]
    fn test_zero_total_means_zero_percent() {
        let progress = compute(&log(1000), &[step("artists", 0, 0, 0)], 1010);
        assert_eq!(progress.progress_percent, 0);
        assert!(progress.eta_seconds.is_none());
    }

    #[test]
    fn test_eta_projects_observed_rate() {
        // 50 of 200 in 10s: 5 items/s, 150 left, 30s to go.
        let progress = compute(&log(1000), &[step("audio_features", 200, 50, 0)], 1010);
        assert_eq!(progress.eta_seconds, Some(30));
    }

    #[test]
    fn test_eta_absent_before_any_progress() {
        let progress = compute(&log(1000), &[step("artists", 100, 0, 0)], 1010);
        assert!(progress.eta_seconds.is_none());

        // Elapsed 0 also yields no ETA even with work done.
        let progress = compute(&log(1000), &[step("artists", 100, 10, 0)], 1000);
        assert!(progress.eta_seconds.is_none());
    }

    #[test]
    fn test_counters_aggregate_across_steps() {
        let steps = [
            step("playlists", 10, 10, 0),
            step("artists", 90, 40, 5),
        ];
        let progress = compute(&log(1000), &steps, 1020);

        assert_eq!(progress.total_items, 100);
        assert_eq!(progress.processed_items, 50);
        assert_eq!(progress.failed_items, 5);
        assert_eq!(progress.progress_percent, 50);
        assert_eq!(progress.steps.len(), 2);
    }

    #[test]
    fn test_timeout_warning_after_an_hour() {
        let progress = compute(&log(1000), &[], 1000 + SYNC_TIMEOUT_SECONDS + 1);
        assert!(progress.timeout_warning);

        let progress = compute(&log(1000), &[], 1000 + SYNC_TIMEOUT_SECONDS);
        assert!(!progress.timeout_warning);
    }
}
