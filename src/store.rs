use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::Context;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use crate::database::Database;
use crate::entities::{
    album, artist, audio_features, playlist, playlist_track, sync_log, sync_progress, track,
    track_artist,
};
use crate::spotify_api::types::{
    ApiAlbum, ApiAudioFeatures, ApiExternalUrls, ApiFullArtist, ApiImage, ApiPlaylist,
    ApiPlaylistItem, ApiSimpleArtist, ApiTrack,
};

pub const FALLBACK_PLAYLIST_NAME: &str = "Untitled playlist";

/// Track-count totals for a finished sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncTotals {
    pub synced: i32,
    pub added: i32,
    pub updated: i32,
}

/// All library and sync-state persistence, backed by SQLite.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> Option<String> {
    value
        .as_ref()
        .and_then(|value| serde_json::to_string(value).ok())
}

impl Store {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert an artist known only from a track listing. On conflict only the
    /// name and link fields are touched, so a previously enriched row keeps
    /// its genres and popularity.
    pub async fn upsert_artist_partial(&self, id: &str, artist: &ApiSimpleArtist) -> Result<()> {
        let model = artist::ActiveModel {
            id: Set(id.to_string()),
            name: Set(artist.name.clone()),
            external_url: Set(ApiExternalUrls::spotify_url(&artist.external_urls)),
            href: Set(artist.href.clone()),
            uri: Set(artist.uri.clone()),
            synced_at: Set(now_ts()),
            ..Default::default()
        };

        artist::Entity::insert(model)
            .on_conflict(
                OnConflict::column(artist::Column::Id)
                    .update_columns([
                        artist::Column::Name,
                        artist::Column::ExternalUrl,
                        artist::Column::Href,
                        artist::Column::Uri,
                        artist::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert artist {id}"))?;

        Ok(())
    }

    /// Overwrite an artist row with the full object from the enrichment
    /// phase. Empty genre lists are stored as an empty JSON array and missing
    /// popularity as 0 so the row no longer matches the enrichment queue.
    pub async fn upsert_artist_full(&self, artist: &ApiFullArtist) -> Result<()> {
        let genres = serde_json::to_string(artist.genres.as_deref().unwrap_or_default()).ok();

        let model = artist::ActiveModel {
            id: Set(artist.id.clone()),
            name: Set(artist.name.clone()),
            genres: Set(genres),
            popularity: Set(Some(artist.popularity.unwrap_or(0))),
            image_url: Set(ApiImage::first_url(&artist.images)),
            external_url: Set(ApiExternalUrls::spotify_url(&artist.external_urls)),
            href: Set(artist.href.clone()),
            uri: Set(artist.uri.clone()),
            followers_total: Set(artist.followers.as_ref().and_then(|f| f.total)),
            images_json: Set(to_json(&artist.images)),
            synced_at: Set(now_ts()),
        };

        artist::Entity::insert(model)
            .on_conflict(
                OnConflict::column(artist::Column::Id)
                    .update_columns([
                        artist::Column::Name,
                        artist::Column::Genres,
                        artist::Column::Popularity,
                        artist::Column::ImageUrl,
                        artist::Column::ExternalUrl,
                        artist::Column::Href,
                        artist::Column::Uri,
                        artist::Column::FollowersTotal,
                        artist::Column::ImagesJson,
                        artist::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert artist {}", artist.id))?;

        Ok(())
    }

    /// Ids of artists that have never been enriched, oldest first.
    pub async fn artists_needing_enrichment(&self, limit: u64) -> Result<Vec<String>> {
        let rows = artist::Entity::find()
            .filter(artist::Column::Genres.is_null())
            .filter(artist::Column::Popularity.is_null())
            .order_by_asc(artist::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query artists needing enrichment")?;

        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    pub async fn upsert_album(&self, id: &str, album: &ApiAlbum) -> Result<()> {
        let model = album::ActiveModel {
            id: Set(id.to_string()),
            name: Set(album.name.clone()),
            release_date: Set(album.release_date.clone()),
            album_type: Set(album.album_type.clone()),
            total_tracks: Set(album.total_tracks),
            image_url: Set(ApiImage::first_url(&album.images)),
            external_url: Set(ApiExternalUrls::spotify_url(&album.external_urls)),
            href: Set(album.href.clone()),
            uri: Set(album.uri.clone()),
            release_date_precision: Set(album.release_date_precision.clone()),
            images_json: Set(to_json(&album.images)),
            available_markets_json: Set(to_json(&album.available_markets)),
            restrictions_reason: Set(album
                .restrictions
                .as_ref()
                .and_then(|r| r.reason.clone())),
            synced_at: Set(now_ts()),
        };

        album::Entity::insert(model)
            .on_conflict(
                OnConflict::column(album::Column::Id)
                    .update_columns([
                        album::Column::Name,
                        album::Column::ReleaseDate,
                        album::Column::AlbumType,
                        album::Column::TotalTracks,
                        album::Column::ImageUrl,
                        album::Column::ExternalUrl,
                        album::Column::Href,
                        album::Column::Uri,
                        album::Column::ReleaseDatePrecision,
                        album::Column::ImagesJson,
                        album::Column::AvailableMarketsJson,
                        album::Column::RestrictionsReason,
                        album::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert album {id}"))?;

        Ok(())
    }

    pub async fn upsert_track(
        &self,
        id: &str,
        track: &ApiTrack,
        album_id: Option<String>,
    ) -> Result<()> {
        let model = track::ActiveModel {
            id: Set(id.to_string()),
            name: Set(track.name.clone()),
            album_id: Set(album_id),
            duration_ms: Set(track.duration_ms),
            explicit: Set(track.explicit.unwrap_or(false)),
            popularity: Set(track.popularity.unwrap_or(0)),
            preview_url: Set(track.preview_url.clone()),
            external_url: Set(ApiExternalUrls::spotify_url(&track.external_urls)),
            href: Set(track.href.clone()),
            uri: Set(track.uri.clone()),
            disc_number: Set(track.disc_number),
            track_number: Set(track.track_number),
            is_local: Set(track.is_local.unwrap_or(false)),
            is_playable: Set(track.is_playable),
            isrc: Set(track
                .external_ids
                .as_ref()
                .and_then(|ids| ids.isrc.clone())),
            external_ids_json: Set(to_json(&track.external_ids)),
            available_markets_json: Set(to_json(&track.available_markets)),
            restrictions_reason: Set(track
                .restrictions
                .as_ref()
                .and_then(|r| r.reason.clone())),
            linked_from_json: Set(to_json(&track.linked_from)),
            synced_at: Set(now_ts()),
        };

        track::Entity::insert(model)
            .on_conflict(
                OnConflict::column(track::Column::Id)
                    .update_columns([
                        track::Column::Name,
                        track::Column::AlbumId,
                        track::Column::DurationMs,
                        track::Column::Explicit,
                        track::Column::Popularity,
                        track::Column::PreviewUrl,
                        track::Column::ExternalUrl,
                        track::Column::Href,
                        track::Column::Uri,
                        track::Column::DiscNumber,
                        track::Column::TrackNumber,
                        track::Column::IsLocal,
                        track::Column::IsPlayable,
                        track::Column::Isrc,
                        track::Column::ExternalIdsJson,
                        track::Column::AvailableMarketsJson,
                        track::Column::RestrictionsReason,
                        track::Column::LinkedFromJson,
                        track::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert track {id}"))?;

        Ok(())
    }

    pub async fn link_track_artist(
        &self,
        track_id: &str,
        artist_id: &str,
        position: i32,
    ) -> Result<()> {
        let model = track_artist::ActiveModel {
            track_id: Set(track_id.to_string()),
            artist_id: Set(artist_id.to_string()),
            position: Set(position),
        };

        track_artist::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    track_artist::Column::TrackId,
                    track_artist::Column::ArtistId,
                ])
                .update_column(track_artist::Column::Position)
                .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to link track {track_id} to artist {artist_id}"))?;

        Ok(())
    }

    /// Upsert a playlist row. Returns true when the playlist was not in the
    /// database before, which a full resync uses to decide whether stale
    /// membership rows need clearing.
    pub async fn upsert_playlist(&self, playlist: &ApiPlaylist, name: String) -> Result<bool> {
        let existing = playlist::Entity::find_by_id(&playlist.id)
            .one(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to look up playlist {}", playlist.id))?;

        let is_new = existing.is_none();

        let model = playlist::ActiveModel {
            id: Set(playlist.id.clone()),
            name: Set(name),
            description: Set(playlist.description.clone()),
            owner_id: Set(playlist.owner.as_ref().and_then(|o| o.id.clone())),
            owner_name: Set(playlist
                .owner
                .as_ref()
                .and_then(|o| o.display_name.clone())),
            public: Set(playlist.public.unwrap_or(false)),
            collaborative: Set(playlist.collaborative.unwrap_or(false)),
            snapshot_id: Set(playlist.snapshot_id.clone()),
            image_url: Set(ApiImage::first_url(&playlist.images)),
            external_url: Set(ApiExternalUrls::spotify_url(&playlist.external_urls)),
            href: Set(playlist.href.clone()),
            uri: Set(playlist.uri.clone()),
            primary_color: Set(playlist.primary_color.clone()),
            tracks_total: Set(playlist.tracks.as_ref().and_then(|t| t.total)),
            owner_uri: Set(playlist.owner.as_ref().and_then(|o| o.uri.clone())),
            owner_external_url: Set(playlist
                .owner
                .as_ref()
                .and_then(|o| ApiExternalUrls::spotify_url(&o.external_urls))),
            owner_type: Set(playlist.owner.as_ref().and_then(|o| o.kind.clone())),
            images_json: Set(to_json(&playlist.images)),
            synced_at: Set(now_ts()),
        };

        if is_new {
            playlist::Entity::insert(model)
                .exec_without_returning(&self.db.conn)
                .await
                .wrap_err_with(|| format!("Failed to insert playlist {}", playlist.id))?;
        } else {
            model
                .update(&self.db.conn)
                .await
                .wrap_err_with(|| format!("Failed to update playlist {}", playlist.id))?;
        }

        Ok(is_new)
    }

    pub async fn clear_playlist_tracks(&self, playlist_id: &str) -> Result<u64> {
        let result = playlist_track::Entity::delete_many()
            .filter(playlist_track::Column::PlaylistId.eq(playlist_id))
            .exec(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to clear tracks of playlist {playlist_id}"))?;

        debug!(playlist_id, removed = result.rows_affected, "Cleared playlist tracks");

        Ok(result.rows_affected)
    }

    pub async fn add_playlist_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        position: i32,
        item: &ApiPlaylistItem,
    ) -> Result<()> {
        let model = playlist_track::ActiveModel {
            playlist_id: Set(playlist_id.to_string()),
            track_id: Set(track_id.to_string()),
            position: Set(position),
            added_at: Set(item.added_at.clone()),
            added_by: Set(item.added_by.as_ref().and_then(|o| o.id.clone())),
            added_by_type: Set(item.added_by.as_ref().and_then(|o| o.kind.clone())),
            added_by_uri: Set(item.added_by.as_ref().and_then(|o| o.uri.clone())),
            added_by_href: Set(item.added_by.as_ref().and_then(|o| o.href.clone())),
            added_by_external_url: Set(item
                .added_by
                .as_ref()
                .and_then(|o| ApiExternalUrls::spotify_url(&o.external_urls))),
            is_local: Set(item.is_local.unwrap_or(false)),
            video_thumbnail_url: Set(item
                .video_thumbnail
                .as_ref()
                .and_then(|t| t.url.clone())),
        };

        playlist_track::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    playlist_track::Column::PlaylistId,
                    playlist_track::Column::TrackId,
                    playlist_track::Column::Position,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| {
                format!("Failed to add track {track_id} to playlist {playlist_id}")
            })?;

        Ok(())
    }

    pub async fn upsert_audio_features(&self, features: &ApiAudioFeatures) -> Result<()> {
        let model = audio_features::ActiveModel {
            track_id: Set(features.id.clone()),
            danceability: Set(features.danceability),
            energy: Set(features.energy),
            key: Set(features.key),
            loudness: Set(features.loudness),
            mode: Set(features.mode),
            speechiness: Set(features.speechiness),
            acousticness: Set(features.acousticness),
            instrumentalness: Set(features.instrumentalness),
            liveness: Set(features.liveness),
            valence: Set(features.valence),
            tempo: Set(features.tempo),
            time_signature: Set(features.time_signature),
            duration_ms: Set(features.duration_ms),
            analysis_url: Set(features.analysis_url.clone()),
            track_href: Set(features.track_href.clone()),
            uri: Set(features.uri.clone()),
        };

        audio_features::Entity::insert(model)
            .on_conflict(
                OnConflict::column(audio_features::Column::TrackId)
                    .update_columns([
                        audio_features::Column::Danceability,
                        audio_features::Column::Energy,
                        audio_features::Column::Key,
                        audio_features::Column::Loudness,
                        audio_features::Column::Mode,
                        audio_features::Column::Speechiness,
                        audio_features::Column::Acousticness,
                        audio_features::Column::Instrumentalness,
                        audio_features::Column::Liveness,
                        audio_features::Column::Valence,
                        audio_features::Column::Tempo,
                        audio_features::Column::TimeSignature,
                        audio_features::Column::DurationMs,
                        audio_features::Column::AnalysisUrl,
                        audio_features::Column::TrackHref,
                        audio_features::Column::Uri,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert audio features for {}", features.id))?;

        Ok(())
    }

    /// Ids of non-local tracks without an audio_features row.
    pub async fn tracks_needing_audio_features(&self, limit: u64) -> Result<Vec<String>> {
        let rows = track::Entity::find()
            .filter(track::Column::IsLocal.eq(false))
            .filter(
                track::Column::Id.not_in_subquery(
                    Query::select()
                        .column(audio_features::Column::TrackId)
                        .from(audio_features::Entity)
                        .to_owned(),
                ),
            )
            .order_by_asc(track::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query tracks needing audio features")?;

        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    pub async fn create_sync_log(&self, sync_type: &str) -> Result<sync_log::Model> {
        let model = sync_log::ActiveModel {
            sync_type: Set(sync_type.to_string()),
            started_at: Set(now_ts()),
            status: Set(sync_log::STATUS_RUNNING.to_string()),
            ..Default::default()
        };

        let result = sync_log::Entity::insert(model)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to create sync log")?;

        sync_log::Entity::find_by_id(result.last_insert_id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to reload sync log")?
            .ok_or_else(|| color_eyre::eyre::eyre!("Sync log vanished after insert"))
    }

    pub async fn complete_sync_log(
        &self,
        id: i64,
        status: &str,
        error: Option<String>,
        totals: Option<SyncTotals>,
    ) -> Result<()> {
        let model = sync_log::ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            completed_at: Set(Some(now_ts())),
            error: Set(error),
            items_synced: Set(totals.map(|t| t.synced)),
            items_added: Set(totals.map(|t| t.added)),
            items_updated: Set(totals.map(|t| t.updated)),
            ..Default::default()
        };

        model
            .update(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to complete sync log {id}"))?;

        Ok(())
    }

    pub async fn latest_sync_log(&self) -> Result<Option<sync_log::Model>> {
        sync_log::Entity::find()
            .order_by_desc(sync_log::Column::StartedAt)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query latest sync log")
    }

    pub async fn latest_running_sync(&self) -> Result<Option<sync_log::Model>> {
        sync_log::Entity::find()
            .filter(sync_log::Column::Status.eq(sync_log::STATUS_RUNNING))
            .order_by_desc(sync_log::Column::StartedAt)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query running sync log")
    }

    pub async fn recent_sync_logs(&self, limit: u64) -> Result<Vec<sync_log::Model>> {
        sync_log::Entity::find()
            .order_by_desc(sync_log::Column::StartedAt)
            .limit(limit)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query recent sync logs")
    }

    /// Insert or update one phase's progress counters. `started_at` is only
    /// written on first insert; `completed_at` is set when the phase reports
    /// itself done.
    pub async fn upsert_sync_progress(
        &self,
        sync_log_id: i64,
        step: &str,
        total: i64,
        processed: i64,
        failed: i64,
        completed: bool,
    ) -> Result<()> {
        let now = now_ts();

        let model = sync_progress::ActiveModel {
            sync_log_id: Set(sync_log_id),
            step: Set(step.to_string()),
            total_items: Set(total),
            processed_items: Set(processed),
            failed_items: Set(failed),
            started_at: Set(now),
            updated_at: Set(now),
            completed_at: Set(completed.then_some(now)),
        };

        sync_progress::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    sync_progress::Column::SyncLogId,
                    sync_progress::Column::Step,
                ])
                .update_columns([
                    sync_progress::Column::TotalItems,
                    sync_progress::Column::ProcessedItems,
                    sync_progress::Column::FailedItems,
                    sync_progress::Column::UpdatedAt,
                    sync_progress::Column::CompletedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to upsert progress for step {step}"))?;

        Ok(())
    }

    pub async fn sync_progress_for(&self, sync_log_id: i64) -> Result<Vec<sync_progress::Model>> {
        sync_progress::Entity::find()
            .filter(sync_progress::Column::SyncLogId.eq(sync_log_id))
            .order_by_asc(sync_progress::Column::StartedAt)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query sync progress")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    fn simple_artist(name: &str) -> ApiSimpleArtist {
        ApiSimpleArtist {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn full_artist(id: &str, genres: Vec<&str>, popularity: Option<i32>) -> ApiFullArtist {
        ApiFullArtist {
            id: id.to_string(),
            name: format!("artist {id}"),
            genres: Some(genres.into_iter().map(String::from).collect()),
            popularity,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_partial_upsert_keeps_enrichment() {
        let store = Store::new(test_db().await);

        store
            .upsert_artist_full(&full_artist("a1", vec!["jazz"], Some(70)))
            .await
            .unwrap();

        // A later playlist sync re-seeing the artist must not reset genres.
        store
            .upsert_artist_partial("a1", &simple_artist("renamed"))
            .await
            .unwrap();

        let queue = store.artists_needing_enrichment(10).await.unwrap();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_queue_matches_unenriched_only() {
        let store = Store::new(test_db().await);

        store
            .upsert_artist_partial("a1", &simple_artist("one"))
            .await
            .unwrap();
        store
            .upsert_artist_full(&full_artist("a2", vec![], None))
            .await
            .unwrap();

        let queue = store.artists_needing_enrichment(10).await.unwrap();
        assert_eq!(queue, vec!["a1".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_playlist_reports_is_new() {
        let store = Store::new(test_db().await);

        let playlist = ApiPlaylist {
            id: "p1".to_string(),
            name: "Road Trip".to_string(),
            ..Default::default()
        };

        assert!(store
            .upsert_playlist(&playlist, "Road Trip".to_string())
            .await
            .unwrap());
        assert!(!store
            .upsert_playlist(&playlist, "Road Trip".to_string())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_tracks_needing_audio_features_excludes_covered() {
        let store = Store::new(test_db().await);

        let track = ApiTrack::default();
        store.upsert_track("t1", &track, None).await.unwrap();
        store.upsert_track("t2", &track, None).await.unwrap();

        store
            .upsert_audio_features(&ApiAudioFeatures {
                id: "t1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let queue = store.tracks_needing_audio_features(10).await.unwrap();
        assert_eq!(queue, vec!["t2".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_progress_upsert_overwrites_counters() {
        let store = Store::new(test_db().await);

        let log = store.create_sync_log("playlists").await.unwrap();
        store
            .upsert_sync_progress(log.id, "artists", 100, 10, 0, false)
            .await
            .unwrap();
        store
            .upsert_sync_progress(log.id, "artists", 100, 100, 5, true)
            .await
            .unwrap();

        let rows = store.sync_progress_for(log.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].processed_items, 100);
        assert_eq!(rows[0].failed_items, 5);
        assert!(rows[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_complete_sync_log_records_totals() {
        let store = Store::new(test_db().await);

        let log = store.create_sync_log("playlists").await.unwrap();
        assert_eq!(log.status, sync_log::STATUS_RUNNING);

        store
            .complete_sync_log(
                log.id,
                sync_log::STATUS_SUCCESS,
                None,
                Some(SyncTotals {
                    synced: 42,
                    added: 40,
                    updated: 2,
                }),
            )
            .await
            .unwrap();

        let latest = store.latest_sync_log().await.unwrap().unwrap();
        assert_eq!(latest.status, sync_log::STATUS_SUCCESS);
        assert_eq!(latest.items_synced, Some(42));
        assert!(latest.completed_at.is_some());
        assert!(store.latest_running_sync().await.unwrap().is_none());
    }
}
