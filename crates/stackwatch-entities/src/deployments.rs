use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stackwatch_core::UtcDateTime;

/// One deployment of a service.
///
/// `completed_at` is stamped by the service layer when an update carries a
/// terminal status ("success" or "failed").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deployments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub version: String,
    pub status: String,
    pub service_id: Option<i64>,
    pub strategy: Option<String>,
    pub progress: Option<i32>,
    pub created_at: UtcDateTime,
    pub completed_at: Option<UtcDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
