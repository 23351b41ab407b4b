use color_eyre::Result;
use tracing::debug;

use crate::spotify_api::types::{ApiAudioFeatures, ApiFullArtist, ApiPlaylist, ApiPlaylistItem};
use crate::store::{FALLBACK_PLAYLIST_NAME, Store};

/// Maps upstream objects onto library rows. Shared by the live sync and the
/// dump replayer so both produce identical databases from the same responses.
pub struct LibraryWriter {
    store: Store,
}

impl LibraryWriter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Upsert a playlist row, returning true when it is new to the database.
    pub async fn write_playlist(&self, playlist: &ApiPlaylist) -> Result<bool> {
        let name = if playlist.name.trim().is_empty() {
            FALLBACK_PLAYLIST_NAME.to_string()
        } else {
            playlist.name.clone()
        };

        self.store.upsert_playlist(playlist, name).await
    }

    pub async fn clear_playlist_tracks(&self, playlist_id: &str) -> Result<u64> {
        self.store.clear_playlist_tracks(playlist_id).await
    }

    /// Write one playlist item at the given position. Returns false when the
    /// item is skipped (missing track, episode, local file, or no id); the
    /// caller must not consume a position for skipped items.
    pub async fn write_item(
        &self,
        playlist_id: &str,
        position: i32,
        item: &ApiPlaylistItem,
    ) -> Result<bool> {
        let Some(track) = &item.track else {
            return Ok(false);
        };

        if track.kind.as_deref() != Some("track")
            || item.is_local.unwrap_or(false)
            || track.is_local.unwrap_or(false)
        {
            return Ok(false);
        }

        let Some(track_id) = &track.id else {
            return Ok(false);
        };

        // Referential order: album and artists before the track, links and
        // membership after it.
        let mut album_id = None;
        if let Some(album) = &track.album {
            if let Some(id) = &album.id {
                self.store.upsert_album(id, album).await?;
                album_id = Some(id.clone());
            }
        }

        let artists = track.artists.as_deref().unwrap_or_default();
        for artist in artists {
            if let Some(id) = &artist.id {
                self.store.upsert_artist_partial(id, artist).await?;
            }
        }

        self.store.upsert_track(track_id, track, album_id).await?;

        for (index, artist) in artists.iter().enumerate() {
            if let Some(id) = &artist.id {
                self.store
                    .link_track_artist(track_id, id, index as i32)
                    .await?;
            }
        }

        self.store
            .add_playlist_track(playlist_id, track_id, position, item)
            .await?;

        Ok(true)
    }

    pub async fn enrich_artist(&self, artist: &ApiFullArtist) -> Result<()> {
        debug!(artist_id = %artist.id, "Enriching artist");
        self.store.upsert_artist_full(artist).await
    }

    pub async fn write_audio_features(&self, features: &ApiAudioFeatures) -> Result<()> {
        self.store.upsert_audio_features(features).await
    }
}
