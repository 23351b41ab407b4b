pub mod artists;
pub mod audio_features;
pub mod dump;
pub mod orchestrator;
pub mod paginator;
pub mod playlists;
pub mod progress;
pub mod replay;
pub mod status;
pub mod writer;

pub use dump::DumpRecorder;
pub use orchestrator::SyncEngine;
pub use replay::Replayer;
pub use status::StatusReader;
pub use writer::LibraryWriter;
