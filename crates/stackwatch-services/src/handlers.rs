use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stackwatch_core::{Problem, ServiceError, UtcDateTime};
use stackwatch_entities::services;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{MicroserviceService, ServicePayload};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_services,
        get_service_by_id,
        create_service,
        update_service,
        delete_service,
        get_services_by_type,
        get_services_by_status,
        get_spring_boot_services,
        get_service_stats,
        search_services
    ),
    components(schemas(ServiceResponse, ServiceStats, ServicePayload)),
    info(
        title = "Services API",
        description = "Catalog of simulated microservices: CRUD, filters by type \
        and status, substring name search, and active/total counts.",
        version = "1.0.0"
    )
)]
pub struct ServicesApiDoc;

pub struct AppState {
    pub microservice_service: Arc<MicroserviceService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/services", get(get_all_services).post(create_service))
        .route("/api/services/stats", get(get_service_stats))
        .route("/api/services/search", get(search_services))
        .route("/api/services/spring-boot", get(get_spring_boot_services))
        .route(
            "/api/services/{id}",
            get(get_service_by_id)
                .put(update_service)
                .delete(delete_service),
        )
        .route("/api/services/type/{type}", get(get_services_by_type))
        .route("/api/services/status/{status}", get(get_services_by_status))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
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
    pub config: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: UtcDateTime,
}

impl From<services::Model> for ServiceResponse {
    fn from(model: services::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            service_type: model.service_type,
            status: model.status,
            port: model.port,
            cpu: model.cpu,
            memory: model.memory,
            instances: model.instances,
            version: model.version,
            spring_boot_version: model.spring_boot_version,
            java_version: model.java_version,
            framework: model.framework,
            profiles: model.profiles,
            actuator_port: model.actuator_port,
            config: model.config,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub active_services: u64,
    pub total_services: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: String,
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services",
    responses((status = 200, description = "All services", body = [ServiceResponse]))
)]
pub async fn get_all_services(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let services = state.microservice_service.get_all_services().await?;
    let response: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service details", body = ServiceResponse),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.microservice_service.get_service_by_id(id).await? {
        Some(service) => Ok(Json(ServiceResponse::from(service)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Services",
    post,
    path = "/api/services",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    debug!("Creating service {:?}", payload.name);
    let created = state.microservice_service.create_service(payload).await?;
    Ok((StatusCode::CREATED, Json(ServiceResponse::from(created))))
}

#[utoipa::path(
    tag = "Services",
    put,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service ID")),
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    match state.microservice_service.update_service(id, payload).await {
        Ok(updated) => Ok(Json(ServiceResponse::from(updated)).into_response()),
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    tag = "Services",
    delete,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service ID")),
    responses((status = 204, description = "Service deleted (idempotent)"))
)]
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.microservice_service.delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/type/{type}",
    params(("type" = String, Path, description = "Service type")),
    responses((status = 200, description = "Services of the given type", body = [ServiceResponse]))
)]
pub async fn get_services_by_type(
    State(state): State<Arc<AppState>>,
    Path(service_type): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let services = state
        .microservice_service
        .get_services_by_type(&service_type)
        .await?;
    let response: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/status/{status}",
    params(("status" = String, Path, description = "Service status")),
    responses((status = 200, description = "Services with the given status", body = [ServiceResponse]))
)]
pub async fn get_services_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let services = state
        .microservice_service
        .get_services_by_status(&status)
        .await?;
    let response: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/spring-boot",
    responses(
        (status = 200, description = "Services with a Spring Boot version", body = [ServiceResponse])
    )
)]
pub async fn get_spring_boot_services(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let services = state.microservice_service.get_spring_boot_services().await?;
    let response: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/stats",
    responses((status = 200, description = "Active and total service counts", body = ServiceStats))
)]
pub async fn get_service_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let active_services = state.microservice_service.get_active_service_count().await?;
    let total_services = state.microservice_service.get_service_count().await?;

    Ok(Json(ServiceStats {
        active_services,
        total_services,
    }))
}

#[utoipa::path(
    tag = "Services",
    get,
    path = "/api/services/search",
    params(("name" = String, Query, description = "Substring to match against service names")),
    responses((status = 200, description = "Matching services", body = [ServiceResponse]))
)]
pub async fn search_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, Problem> {
    let services = state
        .microservice_service
        .search_services_by_name(&params.name)
        .await?;
    let response: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    Ok(Json(response))
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
            microservice_service: Arc::new(MicroserviceService::new(test_db.db.clone())),
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

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_get_and_stats_roundtrip() {
        let (_db, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/services",
                serde_json::json!({"name": "payments", "type": "core", "status": "running"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);
        assert_eq!(created["type"], "core");
        assert!(!created["createdAt"].is_null());

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/services/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "payments");
        assert_eq!(fetched["status"], "running");

        let response = app
            .oneshot(get_request("/api/services/stats"))
            .await
            .unwrap();
        let stats = body_json(response).await;
        assert_eq!(stats["activeServices"], 1);
        assert_eq!(stats["totalServices"], 1);
    }

    #[tokio::test]
    async fn get_missing_service_returns_404_with_empty_body() {
        let (_db, app) = test_app().await;

        let response = app
            .oneshot(get_request("/api/services/424242"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let (_db, app) = test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/services",
                serde_json::json!({"name": "", "type": "core"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let errors = body["errors"].as_array().unwrap();
        let fields: Vec<&str> = errors
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "status"]);
    }

    #[tokio::test]
    async fn search_uses_query_parameter() {
        let (_db, app) = test_app().await;

        for name in ["order-service", "order-worker", "billing"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/services",
                    serde_json::json!({"name": name, "type": "core", "status": "running"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(get_request("/api/services/search?name=order"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let matches = body_json(response).await;
        assert_eq!(matches.as_array().unwrap().len(), 2);
    }
}
