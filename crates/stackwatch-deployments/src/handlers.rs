use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use stackwatch_core::{Problem, ServiceError, UtcDateTime};
use stackwatch_entities::deployments;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{DeploymentPayload, DeploymentService};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_deployments,
        get_deployment_by_id,
        create_deployment,
        update_deployment,
        delete_deployment,
        get_deployments_by_service_id,
        get_deployments_by_status,
        get_deployment_stats
    ),
    components(schemas(DeploymentResponse, DeploymentStats, DeploymentPayload)),
    info(
        title = "Deployments API",
        description = "Deployment records for the simulated services, including \
        per-status counts and terminal-status completion stamping.",
        version = "1.0.0"
    )
)]
pub struct DeploymentsApiDoc;

pub struct AppState {
    pub deployment_service: Arc<DeploymentService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/deployments",
            get(get_all_deployments).post(create_deployment),
        )
        .route("/api/deployments/stats", get(get_deployment_stats))
        .route(
            "/api/deployments/{id}",
            get(get_deployment_by_id)
                .put(update_deployment)
                .delete(delete_deployment),
        )
        .route(
            "/api/deployments/service/{service_id}",
            get(get_deployments_by_service_id),
        )
        .route(
            "/api/deployments/status/{status}",
            get(get_deployments_by_status),
        )
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResponse {
    pub id: i64,
    pub version: String,
    pub status: String,
    pub service_id: Option<i64>,
    pub strategy: Option<String>,
    pub progress: Option<i32>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<UtcDateTime>,
}

impl From<deployments::Model> for DeploymentResponse {
    fn from(model: deployments::Model) -> Self {
        Self {
            id: model.id,
            version: model.version,
            status: model.status,
            service_id: model.service_id,
            strategy: model.strategy,
            progress: model.progress,
            created_at: model.created_at,
            completed_at: model.completed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStats {
    pub success_count: u64,
    pub failed_count: u64,
    pub in_progress_count: u64,
}

#[utoipa::path(
    tag = "Deployments",
    get,
    path = "/api/deployments",
    responses(
        (status = 200, description = "All deployments, newest first", body = [DeploymentResponse])
    )
)]
pub async fn get_all_deployments(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let deployments = state.deployment_service.get_all_deployments().await?;
    let response: Vec<DeploymentResponse> =
        deployments.into_iter().map(DeploymentResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Deployments",
    get,
    path = "/api/deployments/{id}",
    params(("id" = i64, Path, description = "Deployment ID")),
    responses(
        (status = 200, description = "Deployment details", body = DeploymentResponse),
        (status = 404, description = "Deployment not found")
    )
)]
pub async fn get_deployment_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.deployment_service.get_deployment_by_id(id).await? {
        Some(deployment) => Ok(Json(DeploymentResponse::from(deployment)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Deployments",
    post,
    path = "/api/deployments",
    request_body = DeploymentPayload,
    responses(
        (status = 201, description = "Deployment created", body = DeploymentResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_deployment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DeploymentPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    debug!("Creating deployment {:?}", payload.version);
    let created = state.deployment_service.create_deployment(payload).await?;
    Ok((StatusCode::CREATED, Json(DeploymentResponse::from(created))))
}

#[utoipa::path(
    tag = "Deployments",
    put,
    path = "/api/deployments/{id}",
    params(("id" = i64, Path, description = "Deployment ID")),
    request_body = DeploymentPayload,
    responses(
        (status = 200, description = "Deployment updated", body = DeploymentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Deployment not found")
    )
)]
pub async fn update_deployment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<DeploymentPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    match state.deployment_service.update_deployment(id, payload).await {
        Ok(updated) => Ok(Json(DeploymentResponse::from(updated)).into_response()),
        // Missed updates report a bare 404, not an error payload
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    tag = "Deployments",
    delete,
    path = "/api/deployments/{id}",
    params(("id" = i64, Path, description = "Deployment ID")),
    responses((status = 204, description = "Deployment deleted (idempotent)"))
)]
pub async fn delete_deployment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.deployment_service.delete_deployment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Deployments",
    get,
    path = "/api/deployments/service/{service_id}",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Deployments for the service, newest first", body = [DeploymentResponse])
    )
)]
pub async fn get_deployments_by_service_id(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let deployments = state
        .deployment_service
        .get_deployments_by_service_id(service_id)
        .await?;
    let response: Vec<DeploymentResponse> =
        deployments.into_iter().map(DeploymentResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Deployments",
    get,
    path = "/api/deployments/status/{status}",
    params(("status" = String, Path, description = "Deployment status")),
    responses(
        (status = 200, description = "Deployments with the given status", body = [DeploymentResponse])
    )
)]
pub async fn get_deployments_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let deployments = state
        .deployment_service
        .get_deployments_by_status(&status)
        .await?;
    let response: Vec<DeploymentResponse> =
        deployments.into_iter().map(DeploymentResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Deployments",
    get,
    path = "/api/deployments/stats",
    responses((status = 200, description = "Per-status deployment counts", body = DeploymentStats))
)]
pub async fn get_deployment_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let success_count = state
        .deployment_service
        .get_deployment_count_by_status("success")
        .await?;
    let failed_count = state
        .deployment_service
        .get_deployment_count_by_status("failed")
        .await?;
    let in_progress_count = state
        .deployment_service
        .get_deployment_count_by_status("in-progress")
        .await?;

    Ok(Json(DeploymentStats {
        success_count,
        failed_count,
        in_progress_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use stackwatch_database::test_utils::TestDatabase;
    use tower::ServiceExt;

    async fn test_app() -> (TestDatabase, Router) {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let state = Arc::new(AppState {
            deployment_service: Arc::new(DeploymentService::new(test_db.db.clone())),
        });
        (test_db, configure_routes().with_state(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_complete_deployment() {
        let (_db, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/deployments",
                serde_json::json!({"version": "1.2.0", "status": "in-progress", "serviceId": 7}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert!(created["id"].as_i64().unwrap() > 0);
        assert_eq!(created["serviceId"], 7);
        assert!(created["completedAt"].is_null());

        let id = created["id"].as_i64().unwrap();
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/deployments/{}", id),
                serde_json::json!({"version": "1.2.0", "status": "success", "serviceId": 7}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let updated = body_json(response).await;
        assert_eq!(updated["status"], "success");
        assert!(!updated["completedAt"].is_null());
    }

    #[tokio::test]
    async fn update_missing_deployment_returns_404() {
        let (_db, app) = test_app().await;

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/deployments/999999",
                serde_json::json!({"version": "1.0.0", "status": "success"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_without_required_fields_returns_400() {
        let (_db, app) = test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/deployments",
                serde_json::json!({"strategy": "rolling"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn stats_counts_by_status() {
        let (_db, app) = test_app().await;

        for status in ["success", "success", "failed", "in-progress"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/deployments",
                    serde_json::json!({"version": "1.0.0", "status": status}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/deployments/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats = body_json(response).await;
        assert_eq!(stats["successCount"], 2);
        assert_eq!(stats["failedCount"], 1);
        assert_eq!(stats["inProgressCount"], 1);
    }
}
