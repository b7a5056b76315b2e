use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stackwatch_core::UtcDateTime;

/// Write-once metrics snapshot; never updated, only created/deleted/queried.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub service_id: Option<i64>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub request_count: Option<i32>,
    pub response_time: Option<f64>,
    pub error_rate: Option<f64>,
    pub timestamp: UtcDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
