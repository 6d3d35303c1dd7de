//! `SeaORM` Entity for the agent_logs table
//!
//! Tracks every pipeline stage run for the agent status API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agent_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub agent_name: String,
    pub action: String,
    /// success, error or running
    pub status: String,
    /// Additional details in JSON format
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    /// Wall-clock duration of the run in seconds
    pub execution_time: Option<f64>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
