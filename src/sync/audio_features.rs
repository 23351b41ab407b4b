use color_eyre::Result;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::ports::spotify::{SpotifyApiError, SpotifyClient};
use crate::sync::dump::{AudioFeaturesBatch, DumpPayload, DumpRecorder};
use crate::sync::paginator::RATE_LIMIT_DELAY;
use crate::sync::writer::LibraryWriter;

pub const AUDIO_FEATURES_QUEUE_LIMIT: u64 = 1000;
pub const AUDIO_FEATURES_BATCH_SIZE: usize = 100;

pub const STEP_AUDIO_FEATURES: &str = "audio_features";

#[derive(Debug, Clone, Copy)]
pub struct AudioFeatureTotals {
    /// False when the API rejected the endpoint outright; the run still
    /// counts as successful.
    pub available: bool,
    pub processed: i64,
    pub failed: i64,
}

impl Default for AudioFeatureTotals {
    fn default() -> Self {
        Self {
            available: true,
            processed: 0,
            failed: 0,
        }
    }
}

/// Fetch audio features for tracks that have none. A 403 means the app has no
/// access to the endpoint at all, so the phase writes off the rest of the
/// queue and returns instead of hammering it batch by batch.
pub async fn run_audio_features_phase<C: SpotifyClient + ?Sized>(
    client: &C,
    writer: &LibraryWriter,
    recorder: &DumpRecorder,
    sync_log_id: i64,
) -> Result<AudioFeatureTotals> {
    let queue = writer
        .store()
        .tracks_needing_audio_features(AUDIO_FEATURES_QUEUE_LIMIT)
        .await?;

    if queue.is_empty() {
        info!("No tracks need audio features");
        return Ok(AudioFeatureTotals::default());
    }

    let total = queue.len() as i64;
    let mut totals = AudioFeatureTotals::default();

    for (batch_index, batch) in queue.chunks(AUDIO_FEATURES_BATCH_SIZE).enumerate() {
        if batch_index > 0 {
            sleep(RATE_LIMIT_DELAY).await;
        }

        match client.audio_features_batch(batch).await {
            Ok(features) => {
                recorder.record(DumpPayload::AudioFeaturesBatch(AudioFeaturesBatch {
                    batch_index,
                    ids: batch.to_vec(),
                    audio_features: features.clone(),
                }));

                if features.is_empty() {
                    warn!(batch_index, "Empty audio features response");
                    totals.failed += batch.len() as i64;
                } else {
                    for feature in features.into_iter() {
                        match feature {
                            Some(feature) => {
                                writer.write_audio_features(&feature).await?;
                                totals.processed += 1;
                            }
                            None => totals.failed += 1,
                        }
                    }
                }
            }
            Err(SpotifyApiError::Forbidden) => {
                warn!("Audio features endpoint forbidden, giving up on the rest of the queue");
                totals.available = false;
                totals.failed += total - totals.processed - totals.failed;

                writer
                    .store()
                    .upsert_sync_progress(
                        sync_log_id,
                        STEP_AUDIO_FEATURES,
                        total,
                        totals.processed,
                        totals.failed,
                        true,
                    )
                    .await?;

                return Ok(totals);
            }
            Err(error) => {
                warn!(batch_index, ?error, "Audio features batch failed, skipping");
                totals.failed += batch.len() as i64;
            }
        }

        writer
            .store()
            .upsert_sync_progress(
                sync_log_id,
                STEP_AUDIO_FEATURES,
                total,
                totals.processed,
                totals.failed,
                false,
            )
            .await?;
    }

    writer
        .store()
        .upsert_sync_progress(
            sync_log_id,
            STEP_AUDIO_FEATURES,
            total,
            totals.processed,
            totals.failed,
            true,
        )
        .await?;

    info!(
        processed = totals.processed,
        failed = totals.failed,
        "Audio features phase complete"
    );

    Ok(totals)
}
