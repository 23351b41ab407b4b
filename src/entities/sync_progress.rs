use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Per-phase counters for a sync run, upserted after every page or batch and
/// finalized once with `completed_at`. Each phase runner exclusively owns its
/// own (sync_log_id, step) row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "sync_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sync_log_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub step: String,
    pub total_items: i64,
    pub processed_items: i64,
    pub failed_items: i64,
    pub started_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
