use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Artist rows are written twice: a partial row (name + link fields) during
/// the playlist sync, then overwritten with genres/popularity/images by the
/// enrichment phase. `genres IS NULL AND popularity IS NULL` marks a row as
/// still needing enrichment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// JSON array of genre strings, absent until enriched.
    pub genres: Option<String>,
    pub popularity: Option<i32>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub href: Option<String>,
    pub uri: Option<String>,
    pub followers_total: Option<i64>,
    pub images_json: Option<String>,
    pub synced_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
