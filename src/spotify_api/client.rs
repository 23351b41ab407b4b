use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ports::spotify::{SpotifyApiError, SpotifyClient};
use crate::spotify_api::types::{
    ApiArtistsResponse, ApiAudioFeatures, ApiAudioFeaturesResponse, ApiFullArtist,
    ApiPagedResponse, ApiPlaylist, ApiPlaylistItem,
};
use crate::sync::paginator::Page;

/// Bearer-token client for the Spotify Web API.
pub struct HttpSpotifyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpSpotifyClient {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, SpotifyApiError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!(%url, "Spotify API request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::FORBIDDEN => Err(SpotifyApiError::Forbidden),
            status => Err(SpotifyApiError::Status(status)),
        }
    }
}

#[async_trait]
impl SpotifyClient for HttpSpotifyClient {
    async fn playlists_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Page<ApiPlaylist>, SpotifyApiError> {
        let response: ApiPagedResponse<ApiPlaylist> = self
            .get_json(&format!("/me/playlists?offset={offset}&limit={limit}"))
            .await?;

        Ok(Page::new(response.items, response.next.is_some()))
    }

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<ApiPlaylistItem>, SpotifyApiError> {
        let response: ApiPagedResponse<ApiPlaylistItem> = self
            .get_json(&format!(
                "/playlists/{playlist_id}/tracks?offset={offset}&limit={limit}"
            ))
            .await?;

        Ok(Page::new(response.items, response.next.is_some()))
    }

    async fn artists_batch(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<ApiFullArtist>>, SpotifyApiError> {
        let response: ApiArtistsResponse = self
            .get_json(&format!("/artists?ids={}", ids.join(",")))
            .await?;

        Ok(response.artists)
    }

    async fn audio_features_batch(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<ApiAudioFeatures>>, SpotifyApiError> {
        let response: ApiAudioFeaturesResponse = self
            .get_json(&format!("/audio-features?ids={}", ids.join(",")))
            .await?;

        Ok(response.audio_features.unwrap_or_default())
    }
}
