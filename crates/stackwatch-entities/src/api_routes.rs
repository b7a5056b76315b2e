use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A gateway route mapping onto a target service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_routes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub path: String,
    pub method: String,
    pub gateway_id: Option<i64>,
    pub target_service: String,
    pub is_active: Option<bool>,
    pub rate_limit: Option<i32>,
    pub timeout: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
