pub mod credentials;
pub mod spotify;
