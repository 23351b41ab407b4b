use color_eyre::Result;
use tracing::{debug, info};

use crate::ports::spotify::SpotifyClient;
use crate::sync::dump::{DumpPayload, DumpRecorder, PlaylistItemsPage, PlaylistsPage};
use crate::sync::paginator::PageCursor;
use crate::sync::writer::LibraryWriter;

pub const PLAYLIST_PAGE_LIMIT: u32 = 50;
pub const PLAYLIST_ITEMS_PAGE_LIMIT: u32 = 50;

pub const STEP_PLAYLISTS: &str = "playlists";

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistTotals {
    pub seen: i64,
    pub added: i64,
    pub updated: i64,
}

/// Full resync of every playlist and its tracks. Any upstream or database
/// error aborts the phase; half a playlist listing is worse than none.
pub async fn run_playlist_phase<C: SpotifyClient + ?Sized>(
    client: &C,
    writer: &LibraryWriter,
    recorder: &DumpRecorder,
    sync_log_id: i64,
) -> Result<PlaylistTotals> {
    let mut totals = PlaylistTotals::default();
    let mut cursor = PageCursor::new(PLAYLIST_PAGE_LIMIT);

    loop {
        let page = client.playlists_page(cursor.offset(), cursor.limit()).await?;

        recorder.record(DumpPayload::PlaylistsPage(PlaylistsPage {
            offset: cursor.offset(),
            limit: cursor.limit(),
            items: page.items.clone(),
        }));

        // Total grows page by page; within a page it covers the playlists
        // still ahead, so the mid-phase percent means something.
        let page_total = totals.seen + page.items.len() as i64;

        for playlist in &page.items {
            let is_new = writer.write_playlist(playlist).await?;
            if is_new {
                totals.added += 1;
            } else {
                totals.updated += 1;
                // Stale membership rows would break position contiguity.
                writer.clear_playlist_tracks(&playlist.id).await?;
            }

            let mut position = 0i32;
            let mut item_cursor = PageCursor::new(PLAYLIST_ITEMS_PAGE_LIMIT);

            loop {
                let items_page = client
                    .playlist_items_page(&playlist.id, item_cursor.offset(), item_cursor.limit())
                    .await?;

                recorder.record(DumpPayload::PlaylistItemsPage(PlaylistItemsPage {
                    playlist_id: playlist.id.clone(),
                    offset: item_cursor.offset(),
                    limit: item_cursor.limit(),
                    items: items_page.items.clone(),
                }));

                for item in &items_page.items {
                    if writer.write_item(&playlist.id, position, item).await? {
                        position += 1;
                    }
                }

                if !item_cursor.advance(items_page.has_next).await {
                    break;
                }
            }

            totals.seen += 1;
            debug!(playlist_id = %playlist.id, tracks = position, "Synced playlist");

            writer
                .store()
                .upsert_sync_progress(sync_log_id, STEP_PLAYLISTS, page_total, totals.seen, 0, false)
                .await?;
        }

        if !cursor.advance(page.has_next).await {
            break;
        }
    }

    writer
        .store()
        .upsert_sync_progress(sync_log_id, STEP_PLAYLISTS, totals.seen, totals.seen, 0, true)
        .await?;

    info!(
        playlists = totals.seen,
        added = totals.added,
        updated = totals.updated,
        "Playlist phase complete"
    );

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

    use super::*;
    use crate::entities::playlist_track;
    use crate::ports::spotify::MockSpotifyClient;
    use crate::spotify_api::types::{ApiPlaylist, ApiPlaylistItem, ApiSimpleArtist, ApiTrack};
    use crate::store::Store;
    use crate::sync::paginator::Page;
    use crate::test_utils::test_db;

    fn api_playlist(id: &str) -> ApiPlaylist {
        ApiPlaylist {
            id: id.to_string(),
            name: format!("playlist {id}"),
            ..Default::default()
        }
    }

    fn track_item(track_id: &str) -> ApiPlaylistItem {
        ApiPlaylistItem {
            track: Some(ApiTrack {
                id: Some(track_id.to_string()),
                name: format!("track {track_id}"),
                kind: Some("track".to_string()),
                artists: Some(vec![ApiSimpleArtist {
                    id: Some("a1".to_string()),
                    name: "artist".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn local_item() -> ApiPlaylistItem {
        ApiPlaylistItem {
            is_local: Some(true),
            ..track_item("ignored")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_positions_stay_contiguous_across_skips_and_pages() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        let mut client = MockSpotifyClient::new();
        client
            .expect_playlists_page()
            .times(1)
            .returning(|_, _| Ok(Page::last(vec![api_playlist("p1")])));
        client
            .expect_playlist_items_page()
            .times(2)
            .returning(|_, offset, _| {
                if offset == 0 {
                    Ok(Page::new(vec![track_item("t1"), local_item()], true))
                } else {
                    Ok(Page::last(vec![track_item("t2")]))
                }
            });

        let totals = run_playlist_phase(&client, &writer, &DumpRecorder::disabled(), log.id)
            .await
            .unwrap();
        assert_eq!(totals.seen, 1);
        assert_eq!(totals.added, 1);

        let rows = playlist_track::Entity::find()
            .filter(playlist_track::Column::PlaylistId.eq("p1"))
            .order_by_asc(playlist_track::Column::Position)
            .all(&db.conn)
            .await
            .unwrap();

        let positions: Vec<(String, i32)> = rows
            .into_iter()
            .map(|row| (row.track_id, row.position))
            .collect();
        assert_eq!(
            positions,
            vec![("t1".to_string(), 0), ("t2".to_string(), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_clears_existing_playlist_tracks() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());

        let first_run = store.create_sync_log("playlists").await.unwrap();
        let mut client = MockSpotifyClient::new();
        client
            .expect_playlists_page()
            .returning(|_, _| Ok(Page::last(vec![api_playlist("p1")])));
        client
            .expect_playlist_items_page()
            .returning(|_, _, _| Ok(Page::last(vec![track_item("t1"), track_item("t2")])));
        run_playlist_phase(&client, &writer, &DumpRecorder::disabled(), first_run.id)
            .await
            .unwrap();

        // Second run drops t1 from the playlist.
        let second_run = store.create_sync_log("playlists").await.unwrap();
        let mut client = MockSpotifyClient::new();
        client
            .expect_playlists_page()
            .returning(|_, _| Ok(Page::last(vec![api_playlist("p1")])));
        client
            .expect_playlist_items_page()
            .returning(|_, _, _| Ok(Page::last(vec![track_item("t2")])));
        let totals = run_playlist_phase(&client, &writer, &DumpRecorder::disabled(), second_run.id)
            .await
            .unwrap();
        assert_eq!(totals.updated, 1);

        let rows = playlist_track::Entity::find()
            .filter(playlist_track::Column::PlaylistId.eq("p1"))
            .all(&db.conn)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track_id, "t2");
        assert_eq!(rows[0].position, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_phase_progress_reflects_unprocessed_playlists() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        let mut client = MockSpotifyClient::new();
        client
            .expect_playlists_page()
            .returning(|_, _| Ok(Page::last(vec![api_playlist("p1"), api_playlist("p2")])));
        // p2 spans two item pages, so the run idles on the inter-page delay
        // after p1's progress row is written.
        client
            .expect_playlist_items_page()
            .returning(|playlist_id, offset, _| {
                if playlist_id == "p1" {
                    Ok(Page::last(vec![track_item("t1")]))
                } else if offset == 0 {
                    Ok(Page::new(vec![track_item("t2")], true))
                } else {
                    Ok(Page::last(vec![track_item("t3")]))
                }
            });

        let task_store = store.clone();
        let log_id = log.id;
        let phase = tokio::spawn(async move {
            let writer = LibraryWriter::new(task_store);
            run_playlist_phase(&client, &writer, &DumpRecorder::disabled(), log_id).await
        });

        let mut snapshots: Vec<(i64, i64)> = Vec::new();
        while !phase.is_finished() {
            if let Some(row) = store
                .sync_progress_for(log.id)
                .await
                .unwrap()
                .into_iter()
                .next()
            {
                snapshots.push((row.total_items, row.processed_items));
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        phase.await.unwrap().unwrap();

        assert!(snapshots.contains(&(2, 1)));

        let rows = store.sync_progress_for(log.id).await.unwrap();
        assert_eq!(rows[0].total_items, 2);
        assert_eq!(rows[0].processed_items, 2);
        assert!(rows[0].completed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_error_aborts_phase() {
        let db = test_db().await;
        let store = Store::new(db.clone());
        let writer = LibraryWriter::new(store.clone());
        let log = store.create_sync_log("playlists").await.unwrap();

        let mut client = MockSpotifyClient::new();
        client.expect_playlists_page().returning(|_, _| {
            Err(crate::ports::spotify::SpotifyApiError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        });

        let result = run_playlist_phase(&client, &writer, &DumpRecorder::disabled(), log.id).await;
        assert!(result.is_err());
    }
}
