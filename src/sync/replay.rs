use std::collections::HashMap;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::Context;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::sync::dump::{DumpLine, DumpPayload};
use crate::sync::writer::LibraryWriter;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaySummary {
    pub applied_lines: u64,
    pub skipped_lines: u64,
    pub playlists: u64,
    pub artists: u64,
    pub audio_features: u64,
}

/// Rebuilds a library database from a recorded dump file, line by line,
/// through the same writer the live sync uses. Malformed lines are skipped so
/// a truncated dump still replays as far as it goes.
pub struct Replayer {
    writer: LibraryWriter,
}

impl Replayer {
    pub fn new(writer: LibraryWriter) -> Self {
        Self { writer }
    }

    pub async fn replay(&self, path: &Path) -> Result<ReplaySummary> {
        let file = File::open(path)
            .await
            .wrap_err_with(|| format!("Failed to open dump file {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        let mut summary = ReplaySummary::default();
        // Kept-item position per playlist, mirroring the live sync's counter.
        let mut positions: HashMap<String, i32> = HashMap::new();
        let mut line_number = 0u64;

        while let Some(line) = lines
            .next_line()
            .await
            .wrap_err("Failed to read dump file")?
        {
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DumpLine = match serde_json::from_str(&line) {
                Ok(entry) => entry,
                Err(parse_error) => {
                    warn!(line_number, %parse_error, "Skipping unreadable dump line");
                    summary.skipped_lines += 1;
                    continue;
                }
            };

            self.apply(entry.payload, &mut positions, &mut summary)
                .await
                .wrap_err_with(|| format!("Failed to apply dump line {line_number}"))?;
            summary.applied_lines += 1;
        }

        info!(
            applied = summary.applied_lines,
            skipped = summary.skipped_lines,
            playlists = summary.playlists,
            "Replay complete"
        );

        Ok(summary)
    }

    async fn apply(
        &self,
        payload: DumpPayload,
        positions: &mut HashMap<String, i32>,
        summary: &mut ReplaySummary,
    ) -> Result<()> {
        match payload {
            DumpPayload::PlaylistsPage(page) => {
                for playlist in &page.items {
                    let is_new = self.writer.write_playlist(playlist).await?;
                    if !is_new {
                        self.writer.clear_playlist_tracks(&playlist.id).await?;
                    }
                    positions.insert(playlist.id.clone(), 0);
                    summary.playlists += 1;
                }
            }
            DumpPayload::PlaylistItemsPage(page) => {
                if page.offset == 0 {
                    self.writer.clear_playlist_tracks(&page.playlist_id).await?;
                    positions.insert(page.playlist_id.clone(), 0);
                }

                let position = positions.entry(page.playlist_id.clone()).or_insert(0);
                for item in &page.items {
                    if self
                        .writer
                        .write_item(&page.playlist_id, *position, item)
                        .await?
                    {
                        *position += 1;
                    }
                }
            }
            DumpPayload::ArtistsBatch(batch) => {
                for artist in batch.artists.iter().flatten() {
                    self.writer.enrich_artist(artist).await?;
                    summary.artists += 1;
                }
            }
            DumpPayload::AudioFeaturesBatch(batch) => {
                for features in batch.audio_features.iter().flatten() {
                    self.writer.write_audio_features(features).await?;
                    summary.audio_features += 1;
                }
            }
        }

        Ok(())
    }
}
