use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stackwatch_core::UtcDateTime;

/// Result of one test run against a service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "test_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub framework: String,
    pub test_type: String,
    pub service_id: Option<i64>,
    pub passed: Option<i32>,
    pub failed: Option<i32>,
    pub coverage: Option<f64>,
    pub duration: Option<i32>,
    pub created_at: UtcDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
