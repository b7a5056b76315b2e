use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stackwatch_core::UtcDateTime;

/// A tracked (simulated) microservice.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub service_type: String,
    /// "Active" is conveyed purely by the value "running".
    pub status: String,
    pub port: Option<i32>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub instances: Option<i32>,
    pub version: Option<String>,
    pub spring_boot_version: Option<String>,
    pub java_version: Option<String>,
    pub framework: Option<String>,
    pub profiles: Option<String>,
    pub actuator_port: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub config: Option<String>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
