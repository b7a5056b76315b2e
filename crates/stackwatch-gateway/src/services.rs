use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Deserialize;
use stackwatch_core::{FieldViolations, Problem, ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::api_routes;
use utoipa::ToSchema;

fn default_is_active() -> Option<bool> {
    Some(true)
}

/// Route payload, shared by create and update. A payload that omits
/// `isActive` gets `true`; an explicit JSON `null` stores NULL.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRoutePayload {
    pub path: Option<String>,
    pub method: Option<String>,
    pub gateway_id: Option<i64>,
    pub target_service: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: Option<bool>,
    pub rate_limit: Option<i32>,
    pub timeout: Option<i32>,
}

impl Default for ApiRoutePayload {
    fn default() -> Self {
        Self {
            path: None,
            method: None,
            gateway_id: None,
            target_service: None,
            is_active: default_is_active(),
            rate_limit: None,
            timeout: None,
        }
    }
}

impl ApiRoutePayload {
    pub fn validate(&self) -> Result<(), Problem> {
        let mut violations = FieldViolations::new();
        violations.require("path", self.path.as_deref(), "Path is required");
        violations.require("method", self.method.as_deref(), "Method is required");
        violations.require(
            "targetService",
            self.target_service.as_deref(),
            "Target service is required",
        );
        violations.into_result()
    }
}

#[derive(Clone)]
pub struct ApiRouteService {
    db: Arc<DbConnection>,
}

impl ApiRouteService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Routes keep insertion order; no timestamp column to sort on.
    pub async fn get_all_routes(&self) -> ServiceResult<Vec<api_routes::Model>> {
        api_routes::Entity::find()
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_route_by_id(&self, id: i64) -> ServiceResult<Option<api_routes::Model>> {
        api_routes::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create_route(&self, payload: ApiRoutePayload) -> ServiceResult<api_routes::Model> {
        let route = api_routes::ActiveModel {
            path: Set(payload.path.unwrap_or_default()),
            method: Set(payload.method.unwrap_or_default()),
            gateway_id: Set(payload.gateway_id),
            target_service: Set(payload.target_service.unwrap_or_default()),
            is_active: Set(payload.is_active),
            rate_limit: Set(payload.rate_limit),
            timeout: Set(payload.timeout),
            ..Default::default()
        };

        route
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn update_route(
        &self,
        id: i64,
        payload: ApiRoutePayload,
    ) -> ServiceResult<api_routes::Model> {
        let existing = self
            .get_route_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("API route", id))?;

        let mut route: api_routes::ActiveModel = existing.into();
        route.path = Set(payload.path.unwrap_or_default());
        route.method = Set(payload.method.unwrap_or_default());
        route.gateway_id = Set(payload.gateway_id);
        route.target_service = Set(payload.target_service.unwrap_or_default());
        route.is_active = Set(payload.is_active);
        route.rate_limit = Set(payload.rate_limit);
        route.timeout = Set(payload.timeout);

        route
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_route(&self, id: i64) -> ServiceResult<()> {
        api_routes::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }

    pub async fn get_routes_by_gateway_id(
        &self,
        gateway_id: i64,
    ) -> ServiceResult<Vec<api_routes::Model>> {
        api_routes::Entity::find()
            .filter(api_routes::Column::GatewayId.eq(gateway_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_routes_by_target_service(
        &self,
        target_service: &str,
    ) -> ServiceResult<Vec<api_routes::Model>> {
        api_routes::Entity::find()
            .filter(api_routes::Column::TargetService.eq(target_service))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Only `is_active = true`; NULL rows are excluded along with false.
    pub async fn get_active_routes(&self) -> ServiceResult<Vec<api_routes::Model>> {
        api_routes::Entity::find()
            .filter(api_routes::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_active_route_count(&self) -> ServiceResult<u64> {
        api_routes::Entity::find()
            .filter(api_routes::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_route_count(&self) -> ServiceResult<u64> {
        api_routes::Entity::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}
