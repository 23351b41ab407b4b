pub mod album;
pub mod artist;
pub mod audio_features;
pub mod credentials;
pub mod playlist;
pub mod playlist_track;
pub mod sync_log;
pub mod sync_progress;
pub mod track;
pub mod track_artist;
