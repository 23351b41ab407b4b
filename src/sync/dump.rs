use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::spotify_api::types::{ApiAudioFeatures, ApiFullArtist, ApiPlaylist, ApiPlaylistItem};

/// One raw API response captured during a sync, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DumpPayload {
    #[serde(rename = "playlists.page")]
    PlaylistsPage(PlaylistsPage),
    #[serde(rename = "playlists.items.page")]
    PlaylistItemsPage(PlaylistItemsPage),
    #[serde(rename = "artists.batch")]
    ArtistsBatch(ArtistsBatch),
    #[serde(rename = "audio_features.batch")]
    AudioFeaturesBatch(AudioFeaturesBatch),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistsPage {
    pub offset: u32,
    pub limit: u32,
    pub items: Vec<ApiPlaylist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemsPage {
    pub playlist_id: String,
    pub offset: u32,
    pub limit: u32,
    pub items: Vec<ApiPlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistsBatch {
    pub batch_index: usize,
    pub ids: Vec<String>,
    pub artists: Vec<Option<ApiFullArtist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesBatch {
    pub batch_index: usize,
    pub ids: Vec<String>,
    pub audio_features: Vec<Option<ApiAudioFeatures>>,
}

/// One JSONL line of a dump file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpLine {
    #[serde(flatten)]
    pub payload: DumpPayload,
    pub timestamp: String,
}

/// Appends captured API responses to a JSONL file. Recording failures are
/// logged and swallowed so a broken disk never aborts a sync.
pub struct DumpRecorder {
    path: Option<PathBuf>,
}

impl DumpRecorder {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn record(&self, payload: DumpPayload) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(error) = Self::append(path, &payload) {
            warn!(path = %path.display(), ?error, "Failed to record sync dump entry");
        }
    }

    fn append(path: &Path, payload: &DumpPayload) -> Result<()> {
        let line = DumpLine {
            payload: payload.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_string(&line).wrap_err("Failed to serialize dump entry")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to open dump file {}", path.display()))?;

        writeln!(file, "{json}").wrap_err("Failed to write dump entry")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_line_shape() {
        let line = DumpLine {
            payload: DumpPayload::PlaylistsPage(PlaylistsPage {
                offset: 0,
                limit: 50,
                items: vec![],
            }),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "playlists.page");
        assert_eq!(json["payload"]["limit"], 50);
        assert_eq!(json["timestamp"], "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_dump_line_round_trips_tagged_variants() {
        let json = r#"{"type":"artists.batch","payload":{"batch_index":1,"ids":["a1"],"artists":[null]},"timestamp":"2026-01-01T00:00:00Z"}"#;

        let line: DumpLine = serde_json::from_str(json).unwrap();
        match line.payload {
            DumpPayload::ArtistsBatch(batch) => {
                assert_eq!(batch.batch_index, 1);
                assert_eq!(batch.ids, vec!["a1".to_string()]);
                assert!(batch.artists[0].is_none());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_recorder_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.jsonl");
        let recorder = DumpRecorder::new(Some(path.clone()));

        recorder.record(DumpPayload::PlaylistsPage(PlaylistsPage {
            offset: 0,
            limit: 50,
            items: vec![],
        }));
        recorder.record(DumpPayload::AudioFeaturesBatch(AudioFeaturesBatch {
            batch_index: 0,
            ids: vec!["t1".to_string()],
            audio_features: vec![None],
        }));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_disabled_recorder_writes_nothing() {
        // Must be a no-op rather than an error.
        DumpRecorder::disabled().record(DumpPayload::PlaylistsPage(PlaylistsPage {
            offset: 0,
            limit: 50,
            items: vec![],
        }));
    }
}
