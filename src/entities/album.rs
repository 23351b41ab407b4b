use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "albums")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub release_date: Option<String>,
    pub album_type: Option<String>,
    pub total_tracks: Option<i32>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub release_date_precision: Option<String>,
    pub images_json: Option<String>,
    pub available_markets_json: Option<String>,
    pub restrictions_reason: Option<String>,
    pub synced_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
