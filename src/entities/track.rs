use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `album_id` is nullable: local/non-catalog tracks are excluded upstream, so
/// a non-null value always references an album written earlier in the same
/// sync.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tracks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub album_id: Option<String>,
    pub duration_ms: Option<i32>,
    pub explicit: bool,
    pub popularity: i32,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub disc_number: Option<i32>,
    pub track_number: Option<i32>,
    pub is_local: bool,
    pub is_playable: Option<bool>,
    pub isrc: Option<String>,
    pub external_ids_json: Option<String>,
    pub available_markets_json: Option<String>,
    pub restrictions_reason: Option<String>,
    pub linked_from_json: Option<String>,
    pub synced_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
