use color_eyre::Result;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::ports::spotify::SpotifyClient;
use crate::sync::dump::{ArtistsBatch, DumpPayload, DumpRecorder};
use crate::sync::paginator::RATE_LIMIT_DELAY;
use crate::sync::writer::LibraryWriter;

pub const ARTIST_QUEUE_LIMIT: u64 = 500;
pub const ARTIST_BATCH_SIZE: usize = 50;

pub const STEP_ARTISTS: &str = "artists";

#[derive(Debug, Clone, Copy, Default)]
pub struct ArtistTotals {
    pub processed: i64,
    pub failed: i64,
}

/// Enrich artists that only have a partial row. A failed batch is counted and
/// skipped; the remaining batches still run.
pub async fn run_artist_phase<C: SpotifyClient + ?Sized>(
    client: &C,
    writer: &LibraryWriter,
    recorder: &DumpRecorder,
    sync_log_id: i64,
) -> Result<ArtistTotals> {
    let queue = writer
        .store()
        .artists_needing_enrichment(ARTIST_QUEUE_LIMIT)
        .await?;

    if queue.is_empty() {
        info!("No artists need enrichment");
        return Ok(ArtistTotals::default());
    }

    let total = queue.len() as i64;
    let mut totals = ArtistTotals::default();

    for (batch_index, batch) in queue.chunks(ARTIST_BATCH_SIZE).enumerate() {
        if batch_index > 0 {
            sleep(RATE_LIMIT_DELAY).await;
        }

        match client.artists_batch(batch).await {
            Ok(artists) => {
                recorder.record(DumpPayload::ArtistsBatch(ArtistsBatch {
                    batch_index,
                    ids: batch.to_vec(),
                    artists: artists.clone(),
                }));

                for artist in artists.into_iter() {
                    match artist {
                        Some(artist) => {
                            writer.enrich_artist(&artist).await?;
                            totals.processed += 1;
                        }
                        // Deleted or region-blocked artist id.
                        None => totals.failed += 1,
                    }
                }
            }
            Err(error) => {
                warn!(batch_index, ?error, "Artist batch failed, skipping");
                totals.failed += batch.len() as i64;
            }
        }

        writer
            .store()
            .upsert_sync_progress(
                sync_log_id,
                STEP_ARTISTS,
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
            STEP_ARTISTS,
            total,
            totals.processed,
            totals.failed,
            true,
        )
        .await?;

    info!(
        processed = totals.processed,
        failed = totals.failed,
        "Artist enrichment complete"
    );

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::spotify::{MockSpotifyClient, SpotifyApiError};
    use crate::spotify_api::types::{ApiFullArtist, ApiSimpleArtist};
    use crate::store::Store;
    use crate::test_utils::test_db;

    async fn seed_partial_artists(store: &Store, count: usize) {
        for index in 0..count {
            store
                .upsert_artist_partial(
                    &format!("a{index:03}"),
                    &ApiSimpleArtist {
                        name: format!("artist {index}"),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
    }

    fn full_artist(id: &str) -> ApiFullArtist {
        ApiFullArtist {
            id: id.to_string(),
            name: format!("artist {id}"),
            genres: Some(vec!["rock".to_string()]),
            popularity: Some(50),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_enriches_all_queued_artists() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        seed_partial_artists(&store, 3).await;

        let mut client = MockSpotifyClient::new();
        client
            .expect_artists_batch()
            .times(1)
            .returning(|ids| Ok(ids.iter().map(|id| Some(full_artist(id))).collect()));

        let totals = run_artist_phase(&client, &writer, &DumpRecorder::disabled(), log.id)
            .await
            .unwrap();
        assert_eq!(totals.processed, 3);
        assert_eq!(totals.failed, 0);

        assert!(store.artists_needing_enrichment(10).await.unwrap().is_empty());

        let progress = store.sync_progress_for(log.id).await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].total_items, 3);
        assert!(progress[0].completed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_is_counted_and_skipped() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        // Two batches of 50; the first fails, the second succeeds.
        seed_partial_artists(&store, 60).await;

        let mut client = MockSpotifyClient::new();
        let mut call = 0;
        client.expect_artists_batch().times(2).returning(move |ids| {
            call += 1;
            if call == 1 {
                Err(SpotifyApiError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ))
            } else {
                Ok(ids.iter().map(|id| Some(full_artist(id))).collect())
            }
        });

        let totals = run_artist_phase(&client, &writer, &DumpRecorder::disabled(), log.id)
            .await
            .unwrap();
        assert_eq!(totals.processed, 10);
        assert_eq!(totals.failed, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_counters_never_regress_across_batches() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        // Two batches of 50; the first fails wholesale, the second succeeds.
        seed_partial_artists(&store, 60).await;

        let mut client = MockSpotifyClient::new();
        let mut call = 0;
        client.expect_artists_batch().times(2).returning(move |ids| {
            call += 1;
            if call == 1 {
                Err(SpotifyApiError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ))
            } else {
                Ok(ids.iter().map(|id| Some(full_artist(id))).collect())
            }
        });

        let task_store = store.clone();
        let log_id = log.id;
        let phase = tokio::spawn(async move {
            let writer = LibraryWriter::new(task_store);
            run_artist_phase(&client, &writer, &DumpRecorder::disabled(), log_id).await
        });

        let mut snapshots: Vec<(i64, i64, i64)> = Vec::new();
        while !phase.is_finished() {
            if let Some(row) = store
                .sync_progress_for(log.id)
                .await
                .unwrap()
                .into_iter()
                .next()
            {
                snapshots.push((row.total_items, row.processed_items, row.failed_items));
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        phase.await.unwrap().unwrap();

        let final_row = &store.sync_progress_for(log.id).await.unwrap()[0];
        snapshots.push((
            final_row.total_items,
            final_row.processed_items,
            final_row.failed_items,
        ));

        // The inter-batch delay guarantees the first batch's counters were
        // observed before the second batch ran.
        assert!(snapshots.contains(&(60, 0, 50)));
        assert_eq!(*snapshots.last().unwrap(), (60, 10, 50));

        for (total, processed, failed) in &snapshots {
            assert!(processed + failed <= *total);
        }
        for window in snapshots.windows(2) {
            let (_, p0, f0) = window[0];
            let (_, p1, f1) = window[1];
            assert!(p1 + f1 >= p0 + f0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_skips_api_entirely() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        let client = MockSpotifyClient::new();

        let totals = run_artist_phase(&client, &writer, &DumpRecorder::disabled(), log.id)
            .await
            .unwrap();
        assert_eq!(totals.processed, 0);
        assert!(store.sync_progress_for(log.id).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_artist_slots_count_as_failed() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        seed_partial_artists(&store, 2).await;

        let mut client = MockSpotifyClient::new();
        client
            .expect_artists_batch()
            .returning(|ids| Ok(vec![Some(full_artist(&ids[0])), None]));

        let totals = run_artist_phase(&client, &writer, &DumpRecorder::disabled(), log.id)
            .await
            .unwrap();
        assert_eq!(totals.processed, 1);
        assert_eq!(totals.failed, 1);
    }
}
