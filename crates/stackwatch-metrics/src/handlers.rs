use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stackwatch_core::{Problem, UtcDateTime};
use stackwatch_entities::metrics;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{MetricPayload, MetricService};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_metrics,
        get_metric_by_id,
        create_metric,
        delete_metric,
        get_metrics_by_service_id,
        get_recent_metrics,
        get_latest_metrics,
        get_service_metrics_since,
        get_service_metric_averages
    ),
    components(schemas(MetricResponse, MetricAverages, MetricPayload)),
    info(
        title = "Metrics API",
        description = "Write-once metrics snapshots per simulated service, \
        with windowed reads and per-service averages.",
        version = "1.0.0"
    )
)]
pub struct MetricsApiDoc;

pub struct AppState {
    pub metric_service: Arc<MetricService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/metrics", get(get_all_metrics).post(create_metric))
        .route("/api/metrics/recent", get(get_recent_metrics))
        .route("/api/metrics/latest", get(get_latest_metrics))
        .route(
            "/api/metrics/{id}",
            get(get_metric_by_id).delete(delete_metric),
        )
        .route(
            "/api/metrics/service/{service_id}",
            get(get_metrics_by_service_id),
        )
        .route(
            "/api/metrics/service/{service_id}/recent",
            get(get_service_metrics_since),
        )
        .route(
            "/api/metrics/service/{service_id}/average",
            get(get_service_metric_averages),
        )
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse {
    pub id: i64,
    pub service_id: Option<i64>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub request_count: Option<i32>,
    pub response_time: Option<f64>,
    pub error_rate: Option<f64>,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: UtcDateTime,
}

impl From<metrics::Model> for MetricResponse {
    fn from(model: metrics::Model) -> Self {
        Self {
            id: model.id,
            service_id: model.service_id,
            cpu: model.cpu,
            memory: model.memory,
            request_count: model.request_count,
            response_time: model.response_time,
            error_rate: model.error_rate,
            timestamp: model.timestamp,
        }
    }
}

/// Null fields mean the service has no snapshots at all.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricAverages {
    pub average_cpu: Option<f64>,
    pub average_memory: Option<f64>,
}

fn default_hours() -> i64 {
    24
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    #[serde(default = "default_hours")]
    pub hours: i64,
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics",
    responses((status = 200, description = "All snapshots, newest first", body = [MetricResponse]))
)]
pub async fn get_all_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let metrics = state.metric_service.get_all_metrics().await?;
    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/{id}",
    params(("id" = i64, Path, description = "Metric ID")),
    responses(
        (status = 200, description = "Snapshot details", body = MetricResponse),
        (status = 404, description = "Metric not found")
    )
)]
pub async fn get_metric_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.metric_service.get_metric_by_id(id).await? {
        Some(metric) => Ok(Json(MetricResponse::from(metric)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Metrics",
    post,
    path = "/api/metrics",
    request_body = MetricPayload,
    responses((status = 201, description = "Snapshot recorded", body = MetricResponse))
)]
pub async fn create_metric(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MetricPayload>,
) -> Result<impl IntoResponse, Problem> {
    debug!("Recording metric snapshot for service {:?}", payload.service_id);
    let created = state.metric_service.create_metric(payload).await?;
    Ok((StatusCode::CREATED, Json(MetricResponse::from(created))))
}

#[utoipa::path(
    tag = "Metrics",
    delete,
    path = "/api/metrics/{id}",
    params(("id" = i64, Path, description = "Metric ID")),
    responses((status = 204, description = "Snapshot deleted (idempotent)"))
)]
pub async fn delete_metric(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.metric_service.delete_metric(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/service/{service_id}",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Snapshots for the service, newest first", body = [MetricResponse])
    )
)]
pub async fn get_metrics_by_service_id(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let metrics = state
        .metric_service
        .get_metrics_by_service_id(service_id)
        .await?;
    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/recent",
    params(("hours" = i64, Query, description = "Window size in hours (default 24)")),
    responses(
        (status = 200, description = "Snapshots inside the window, newest first", body = [MetricResponse])
    )
)]
pub async fn get_recent_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, Problem> {
    let metrics = state.metric_service.get_recent_metrics(params.hours).await?;
    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/latest",
    responses(
        (status = 200, description = "Snapshots from the last hour, newest first", body = [MetricResponse])
    )
)]
pub async fn get_latest_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let metrics = state.metric_service.get_recent_metrics(1).await?;
    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/service/{service_id}/recent",
    params(
        ("service_id" = i64, Path, description = "Service ID"),
        ("hours" = i64, Query, description = "Window size in hours (default 24)")
    ),
    responses(
        (status = 200, description = "Windowed snapshots for the service, newest first", body = [MetricResponse])
    )
)]
pub async fn get_service_metrics_since(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, Problem> {
    let metrics = state
        .metric_service
        .get_service_metrics_since(service_id, params.hours)
        .await?;
    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Metrics",
    get,
    path = "/api/metrics/service/{service_id}/average",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses((status = 200, description = "CPU and memory averages", body = MetricAverages))
)]
pub async fn get_service_metric_averages(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let average_cpu = state
        .metric_service
        .get_average_cpu_for_service(service_id)
        .await?;
    let average_memory = state
        .metric_service
        .get_average_memory_for_service(service_id)
        .await?;

    Ok(Json(MetricAverages {
        average_cpu,
        average_memory,
    }))
}
