use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::Context;
use sea_orm::EntityTrait;

use crate::database::Database;
use crate::entities::credentials;

/// Stored Spotify OAuth credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub expires_at: Option<String>,
    pub scope: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// The stored credentials, or None when the account has never been
    /// linked.
    async fn get_credentials(&self) -> Result<Option<Credentials>>;
}

/// Reads the singleton credentials row written by the auth flow.
pub struct DbCredentialsProvider {
    db: std::sync::Arc<Database>,
}

impl DbCredentialsProvider {
    pub fn new(db: std::sync::Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialsProvider for DbCredentialsProvider {
    async fn get_credentials(&self) -> Result<Option<Credentials>> {
        let row = credentials::Entity::find_by_id(1)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to load Spotify credentials")?;

        Ok(row.map(|row| Credentials {
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            scope: row.scope,
        }))
    }
}
