use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "playlists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Never blank; whitespace-only upstream names are stored as a fallback
    /// display string.
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub public: bool,
    pub collaborative: bool,
    pub snapshot_id: Option<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub primary_color: Option<String>,
    pub tracks_total: Option<i32>,
    pub owner_uri: Option<String>,
    pub owner_external_url: Option<String>,
    pub owner_type: Option<String>,
    pub images_json: Option<String>,
    pub synced_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
