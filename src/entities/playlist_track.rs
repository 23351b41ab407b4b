use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Playlist membership with per-playlist ordering. A full resync deletes all
/// of a playlist's rows before reinserting, so positions always form a
/// contiguous 0..n-1 run afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "playlist_tracks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub playlist_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub track_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub added_at: Option<String>,
    pub added_by: Option<String>,
    pub added_by_type: Option<String>,
    pub added_by_uri: Option<String>,
    pub added_by_href: Option<String>,
    pub added_by_external_url: Option<String>,
    pub is_local: bool,
    pub video_thumbnail_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
