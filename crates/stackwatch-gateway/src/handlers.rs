use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use stackwatch_core::{Problem, ServiceError};
use stackwatch_entities::api_routes;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{ApiRoutePayload, ApiRouteService};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_routes,
        get_route_by_id,
        create_route,
        update_route,
        delete_route,
        get_routes_by_gateway_id,
        get_routes_by_target_service,
        get_active_routes,
        get_route_stats
    ),
    components(schemas(ApiRouteResponse, RouteStats, ApiRoutePayload)),
    info(
        title = "Gateway Routes API",
        description = "Simulated API-gateway route table: path/method mappings \
        onto target services, with active/total counts.",
        version = "1.0.0"
    )
)]
pub struct RoutesApiDoc;

pub struct AppState {
    pub api_route_service: Arc<ApiRouteService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/routes", get(get_all_routes).post(create_route))
        .route("/api/routes/stats", get(get_route_stats))
        .route("/api/routes/active", get(get_active_routes))
        .route(
            "/api/routes/{id}",
            get(get_route_by_id).put(update_route).delete(delete_route),
        )
        .route(
            "/api/routes/gateway/{gateway_id}",
            get(get_routes_by_gateway_id),
        )
        .route(
            "/api/routes/service/{target_service}",
            get(get_routes_by_target_service),
        )
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiRouteResponse {
    pub id: i64,
    pub path: String,
    pub method: String,
    pub gateway_id: Option<i64>,
    pub target_service: String,
    pub is_active: Option<bool>,
    pub rate_limit: Option<i32>,
    pub timeout: Option<i32>,
}

impl From<api_routes::Model> for ApiRouteResponse {
    fn from(model: api_routes::Model) -> Self {
        Self {
            id: model.id,
            path: model.path,
            method: model.method,
            gateway_id: model.gateway_id,
            target_service: model.target_service,
            is_active: model.is_active,
            rate_limit: model.rate_limit,
            timeout: model.timeout,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub active_routes: u64,
    pub total_routes: u64,
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes",
    responses((status = 200, description = "All gateway routes", body = [ApiRouteResponse]))
)]
pub async fn get_all_routes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let routes = state.api_route_service.get_all_routes().await?;
    let response: Vec<ApiRouteResponse> = routes.into_iter().map(ApiRouteResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes/{id}",
    params(("id" = i64, Path, description = "Route ID")),
    responses(
        (status = 200, description = "Route details", body = ApiRouteResponse),
        (status = 404, description = "Route not found")
    )
)]
pub async fn get_route_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.api_route_service.get_route_by_id(id).await? {
        Some(route) => Ok(Json(ApiRouteResponse::from(route)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Routes",
    post,
    path = "/api/routes",
    request_body = ApiRoutePayload,
    responses(
        (status = 201, description = "Route created", body = ApiRouteResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApiRoutePayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    debug!("Creating route {:?} -> {:?}", payload.path, payload.target_service);
    let created = state.api_route_service.create_route(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiRouteResponse::from(created))))
}

#[utoipa::path(
    tag = "Routes",
    put,
    path = "/api/routes/{id}",
    params(("id" = i64, Path, description = "Route ID")),
    request_body = ApiRoutePayload,
    responses(
        (status = 200, description = "Route updated", body = ApiRouteResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Route not found")
    )
)]
pub async fn update_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ApiRoutePayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    match state.api_route_service.update_route(id, payload).await {
        Ok(updated) => Ok(Json(ApiRouteResponse::from(updated)).into_response()),
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    tag = "Routes",
    delete,
    path = "/api/routes/{id}",
    params(("id" = i64, Path, description = "Route ID")),
    responses((status = 204, description = "Route deleted (idempotent)"))
)]
pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.api_route_service.delete_route(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes/gateway/{gateway_id}",
    params(("gateway_id" = i64, Path, description = "Gateway ID")),
    responses((status = 200, description = "Routes for the gateway", body = [ApiRouteResponse]))
)]
pub async fn get_routes_by_gateway_id(
    State(state): State<Arc<AppState>>,
    Path(gateway_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let routes = state
        .api_route_service
        .get_routes_by_gateway_id(gateway_id)
        .await?;
    let response: Vec<ApiRouteResponse> = routes.into_iter().map(ApiRouteResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes/service/{target_service}",
    params(("target_service" = String, Path, description = "Target service name")),
    responses((status = 200, description = "Routes targeting the service", body = [ApiRouteResponse]))
)]
pub async fn get_routes_by_target_service(
    State(state): State<Arc<AppState>>,
    Path(target_service): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let routes = state
        .api_route_service
        .get_routes_by_target_service(&target_service)
        .await?;
    let response: Vec<ApiRouteResponse> = routes.into_iter().map(ApiRouteResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes/active",
    responses((status = 200, description = "Routes with is_active = true", body = [ApiRouteResponse]))
)]
pub async fn get_active_routes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let routes = state.api_route_service.get_active_routes().await?;
    let response: Vec<ApiRouteResponse> = routes.into_iter().map(ApiRouteResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Routes",
    get,
    path = "/api/routes/stats",
    responses((status = 200, description = "Active and total route counts", body = RouteStats))
)]
pub async fn get_route_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let active_routes = state.api_route_service.get_active_route_count().await?;
    let total_routes = state.api_route_service.get_route_count().await?;

    Ok(Json(RouteStats {
        active_routes,
        total_routes,
    }))
}
