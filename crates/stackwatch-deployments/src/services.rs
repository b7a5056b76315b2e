use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Deserialize;
use stackwatch_core::{FieldViolations, Problem, ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::deployments;
use utoipa::ToSchema;

/// Statuses that mark a deployment as finished. An update carrying one of
/// these (exact, case-sensitive match) re-stamps `completed_at`; any other
/// status leaves it untouched.
const TERMINAL_STATUSES: [&str; 2] = ["success", "failed"];

/// Deployment payload, shared by create and update.
///
/// Updates overwrite every mutable column with the values sent here, so a
/// partial payload nulls out omitted optional fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentPayload {
    pub version: Option<String>,
    pub status: Option<String>,
    pub service_id: Option<i64>,
    pub strategy: Option<String>,
    pub progress: Option<i32>,
}

impl DeploymentPayload {
    pub fn validate(&self) -> Result<(), Problem> {
        let mut violations = FieldViolations::new();
        violations.require("version", self.version.as_deref(), "Version is required");
        violations.require("status", self.status.as_deref(), "Status is required");
        violations.into_result()
    }
}

#[derive(Clone)]
pub struct DeploymentService {
    db: Arc<DbConnection>,
}

impl DeploymentService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    pub async fn get_all_deployments(&self) -> ServiceResult<Vec<deployments::Model>> {
        deployments::Entity::find()
            .order_by_desc(deployments::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_deployments_by_service_id(
        &self,
        service_id: i64,
    ) -> ServiceResult<Vec<deployments::Model>> {
        deployments::Entity::find()
            .filter(deployments::Column::ServiceId.eq(service_id))
            .order_by_desc(deployments::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_deployments_by_status(
        &self,
        status: &str,
    ) -> ServiceResult<Vec<deployments::Model>> {
        deployments::Entity::find()
            .filter(deployments::Column::Status.eq(status))
            .order_by_desc(deployments::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_deployment_by_id(&self, id: i64) -> ServiceResult<Option<deployments::Model>> {
        deployments::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Insert a deployment. Client-supplied ids and timestamps are ignored;
    /// the stored record gets a fresh id and a server-stamped `created_at`.
    pub async fn create_deployment(
        &self,
        payload: DeploymentPayload,
    ) -> ServiceResult<deployments::Model> {
        let deployment = deployments::ActiveModel {
            version: Set(payload.version.unwrap_or_default()),
            status: Set(payload.status.unwrap_or_default()),
            service_id: Set(payload.service_id),
            strategy: Set(payload.strategy),
            progress: Set(payload.progress),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        };

        deployment
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Full-overwrite update. Fails with `NotFound` if the id is absent.
    /// A terminal incoming status stamps `completed_at = now`.
    pub async fn update_deployment(
        &self,
        id: i64,
        payload: DeploymentPayload,
    ) -> ServiceResult<deployments::Model> {
        let existing = self
            .get_deployment_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Deployment", id))?;

        let status = payload.status.unwrap_or_default();

        let mut deployment: deployments::ActiveModel = existing.into();
        deployment.version = Set(payload.version.unwrap_or_default());
        deployment.service_id = Set(payload.service_id);
        deployment.strategy = Set(payload.strategy);
        deployment.progress = Set(payload.progress);
        if TERMINAL_STATUSES.contains(&status.as_str()) {
            deployment.completed_at = Set(Some(Utc::now()));
        }
        deployment.status = Set(status);

        deployment
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Idempotent: deleting a missing id is not an error.
    pub async fn delete_deployment(&self, id: i64) -> ServiceResult<()> {
        deployments::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }

    pub async fn get_deployment_count_by_status(&self, status: &str) -> ServiceResult<u64> {
        deployments::Entity::find()
            .filter(deployments::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}
