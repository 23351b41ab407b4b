use sea_orm::entity::prelude::*;
use serde::Serialize;

pub const STATUS_RUNNING: &str = "running";
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";

/// One row per sync run, owned by the orchestrator. `completed_at` stays null
/// and `status` stays "running" until the run reaches a terminal state.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "sync_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sync_type: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub status: String,
    pub error: Option<String>,
    pub items_synced: Option<i32>,
    pub items_added: Option<i32>,
    pub items_updated: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
