mod config;
mod database;
mod entities;
mod logging;
mod ports;
mod spotify_api;
mod store;
mod sync;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};

use crate::{
    config::Config,
    database::Database,
    logging::init_tracing,
    ports::credentials::{CredentialsProvider, DbCredentialsProvider},
    spotify_api::HttpSpotifyClient,
    store::Store,
    sync::{
        DumpRecorder, LibraryWriter, Replayer, StatusReader, SyncEngine,
        orchestrator::RunRegistry,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SPOTIFY_MIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync the linked Spotify library into the local database
    Sync {
        /// Record raw API responses to this JSONL file
        #[arg(long, env = "SPOTIFY_SYNC_DUMP_PATH")]
        dump_path: Option<PathBuf>,
    },
    /// Rebuild the database from a recorded dump file
    Replay {
        /// The JSONL dump file to replay
        #[arg(short, long)]
        dump_path: PathBuf,
    },
    /// Show the last sync and any run in progress
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load spotify-mirror config")?;

    let database = Arc::new(Database::open(&config.database_path()).await?);
    let store = Store::new(database.clone());

    match args.command {
        Commands::Sync { dump_path } => {
            let credentials = DbCredentialsProvider::new(database.clone());
            let access_token = credentials
                .get_credentials()
                .await?
                .and_then(|credentials| credentials.access_token)
                .ok_or_else(|| eyre!("Spotify account is not linked, run the auth flow first"))?;

            let client = HttpSpotifyClient::new(config.api_base_url(), access_token);
            let recorder = DumpRecorder::new(dump_path.or_else(|| config.dump_path()));

            let engine = SyncEngine::new(store, client, credentials, recorder);
            let sync_log_id = engine.run_sync().await?;
            tracing::info!(sync_log_id, "Sync finished");
        }
        Commands::Replay { dump_path } => {
            let replayer = Replayer::new(LibraryWriter::new(store));
            let summary = replayer.replay(&dump_path).await?;
            tracing::info!(
                applied = summary.applied_lines,
                skipped = summary.skipped_lines,
                playlists = summary.playlists,
                artists = summary.artists,
                audio_features = summary.audio_features,
                "Replay finished"
            );
        }
        Commands::Status => {
            let reader = StatusReader::new(store, RunRegistry::new());

            let status = reader.get_sync_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
