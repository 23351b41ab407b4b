//! Serde views of the Spotify Web API response shapes consumed by the sync
//! engine. These double as the dump-file payload schema, so fields mirror the
//! upstream JSON names exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiOwner {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub uri: Option<String>,
    pub href: Option<String>,
    pub external_urls: Option<ApiExternalUrls>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiRestrictions {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiFollowers {
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiExternalIds {
    pub isrc: Option<String>,
    pub ean: Option<String>,
    pub upc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiPlaylistTracksRef {
    pub total: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiPlaylist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<ApiOwner>,
    pub public: Option<bool>,
    pub collaborative: Option<bool>,
    pub snapshot_id: Option<String>,
    pub images: Option<Vec<ApiImage>>,
    pub external_urls: Option<ApiExternalUrls>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub primary_color: Option<String>,
    pub tracks: Option<ApiPlaylistTracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiAlbum {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub release_date: Option<String>,
    pub album_type: Option<String>,
    pub total_tracks: Option<i32>,
    pub images: Option<Vec<ApiImage>>,
    pub external_urls: Option<ApiExternalUrls>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub release_date_precision: Option<String>,
    pub available_markets: Option<Vec<String>>,
    pub restrictions: Option<ApiRestrictions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiSimpleArtist {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub external_urls: Option<ApiExternalUrls>,
    pub href: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub album: Option<ApiAlbum>,
    pub artists: Option<Vec<ApiSimpleArtist>>,
    pub duration_ms: Option<i32>,
    pub explicit: Option<bool>,
    pub popularity: Option<i32>,
    pub preview_url: Option<String>,
    pub external_urls: Option<ApiExternalUrls>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub disc_number: Option<i32>,
    pub track_number: Option<i32>,
    pub is_local: Option<bool>,
    pub is_playable: Option<bool>,
    pub external_ids: Option<ApiExternalIds>,
    pub available_markets: Option<Vec<String>>,
    pub restrictions: Option<ApiRestrictions>,
    pub linked_from: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiVideoThumbnail {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiPlaylistItem {
    pub track: Option<ApiTrack>,
    pub added_at: Option<String>,
    pub added_by: Option<ApiOwner>,
    pub is_local: Option<bool>,
    pub video_thumbnail: Option<ApiVideoThumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiFullArtist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub genres: Option<Vec<String>>,
    pub popularity: Option<i32>,
    pub images: Option<Vec<ApiImage>>,
    pub external_urls: Option<ApiExternalUrls>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub followers: Option<ApiFollowers>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiAudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i32,
    pub duration_ms: Option<i32>,
    pub analysis_url: Option<String>,
    pub track_href: Option<String>,
    pub uri: Option<String>,
}

/// Wire shape of the upstream offset/limit paging envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPagedResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArtistsResponse {
    pub artists: Vec<Option<ApiFullArtist>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAudioFeaturesResponse {
    pub audio_features: Option<Vec<Option<ApiAudioFeatures>>>,
}

impl ApiImage {
    pub fn first_url(images: &Option<Vec<ApiImage>>) -> Option<String> {
        images
            .as_ref()
            .and_then(|images| images.first())
            .map(|image| image.url.clone())
    }
}

impl ApiExternalUrls {
    pub fn spotify_url(urls: &Option<ApiExternalUrls>) -> Option<String> {
        urls.as_ref().and_then(|urls| urls.spotify.clone())
    }
}
