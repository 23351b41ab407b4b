use sea_orm::entity::prelude::*;

/// Single-row table (id = 1) written by the external OAuth flow. The refresh
/// token is encrypted by the web tier and carried opaquely here; the sync
/// engine only ever reads `access_token`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "spotify_credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub expires_at: Option<String>,
    pub scope: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
