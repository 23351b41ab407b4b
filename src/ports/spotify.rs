use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::spotify_api::types::{ApiAudioFeatures, ApiFullArtist, ApiPlaylist, ApiPlaylistItem};
use crate::sync::paginator::Page;

#[derive(Debug, Error)]
pub enum SpotifyApiError {
    /// The account or token has no access to the endpoint. Audio features
    /// return this for apps without extended access.
    #[error("Spotify API access forbidden")]
    Forbidden,
    #[error("Spotify API returned status {0}")]
    Status(StatusCode),
    #[error("Spotify API request failed")]
    Request(#[from] reqwest::Error),
}

/// Read-only view of the Spotify Web API used by the sync engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifyClient: Send + Sync {
    /// One page of the current user's playlists.
    async fn playlists_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Page<ApiPlaylist>, SpotifyApiError>;

    /// One page of a playlist's items.
    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<ApiPlaylistItem>, SpotifyApiError>;

    /// Full artist objects for up to 50 ids. The response slot for an unknown
    /// id is None.
    async fn artists_batch(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<ApiFullArtist>>, SpotifyApiError>;

    /// Audio features for up to 100 track ids. Slots may be None for tracks
    /// without analysis.
    async fn audio_features_batch(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<ApiAudioFeatures>>, SpotifyApiError>;
}
