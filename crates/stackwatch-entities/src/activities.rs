use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stackwatch_core::UtcDateTime;

/// Append-mostly activity log entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "type")]
    pub activity_type: String,
    pub message: String,
    pub service_id: Option<i64>,
    pub severity: Option<String>,
    pub created_at: UtcDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
