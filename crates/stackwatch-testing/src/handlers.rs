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
use stackwatch_entities::test_results;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{TestResultPayload, TestResultService};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_test_results,
        get_test_result_by_id,
        create_test_result,
        update_test_result,
        delete_test_result,
        get_test_results_by_service_id,
        get_test_results_by_framework,
        get_test_results_by_type,
        get_test_stats_for_service
    ),
    components(schemas(TestResultResponse, TestStats, TestResultPayload)),
    info(
        title = "Test Results API",
        description = "Recorded test runs per simulated service, with coverage \
        and pass/fail aggregates.",
        version = "1.0.0"
    )
)]
pub struct TestResultsApiDoc;

pub struct AppState {
    pub test_result_service: Arc<TestResultService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/test-results",
            get(get_all_test_results).post(create_test_result),
        )
        .route(
            "/api/test-results/{id}",
            get(get_test_result_by_id)
                .put(update_test_result)
                .delete(delete_test_result),
        )
        .route(
            "/api/test-results/service/{service_id}",
            get(get_test_results_by_service_id),
        )
        .route(
            "/api/test-results/service/{service_id}/stats",
            get(get_test_stats_for_service),
        )
        .route(
            "/api/test-results/framework/{framework}",
            get(get_test_results_by_framework),
        )
        .route(
            "/api/test-results/type/{test_type}",
            get(get_test_results_by_type),
        )
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResultResponse {
    pub id: i64,
    pub framework: String,
    pub test_type: String,
    pub service_id: Option<i64>,
    pub passed: Option<i32>,
    pub failed: Option<i32>,
    pub coverage: Option<f64>,
    pub duration: Option<i32>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
}

impl From<test_results::Model> for TestResultResponse {
    fn from(model: test_results::Model) -> Self {
        Self {
            id: model.id,
            framework: model.framework,
            test_type: model.test_type,
            service_id: model.service_id,
            passed: model.passed,
            failed: model.failed,
            coverage: model.coverage,
            duration: model.duration,
            created_at: model.created_at,
        }
    }
}

/// Null fields mean the service has no recorded runs at all.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    pub average_coverage: Option<f64>,
    pub total_passed: Option<i64>,
    pub total_failed: Option<i64>,
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results",
    responses(
        (status = 200, description = "All test results, newest first", body = [TestResultResponse])
    )
)]
pub async fn get_all_test_results(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let results = state.test_result_service.get_all_test_results().await?;
    let response: Vec<TestResultResponse> =
        results.into_iter().map(TestResultResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results/{id}",
    params(("id" = i64, Path, description = "Test result ID")),
    responses(
        (status = 200, description = "Test result details", body = TestResultResponse),
        (status = 404, description = "Test result not found")
    )
)]
pub async fn get_test_result_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.test_result_service.get_test_result_by_id(id).await? {
        Some(result) => Ok(Json(TestResultResponse::from(result)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Test Results",
    post,
    path = "/api/test-results",
    request_body = TestResultPayload,
    responses(
        (status = 201, description = "Test result recorded", body = TestResultResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_test_result(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TestResultPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    debug!("Recording {:?} test run", payload.framework);
    let created = state.test_result_service.create_test_result(payload).await?;
    Ok((StatusCode::CREATED, Json(TestResultResponse::from(created))))
}

#[utoipa::path(
    tag = "Test Results",
    put,
    path = "/api/test-results/{id}",
    params(("id" = i64, Path, description = "Test result ID")),
    request_body = TestResultPayload,
    responses(
        (status = 200, description = "Test result updated", body = TestResultResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Test result not found")
    )
)]
pub async fn update_test_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<TestResultPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    match state.test_result_service.update_test_result(id, payload).await {
        Ok(updated) => Ok(Json(TestResultResponse::from(updated)).into_response()),
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    tag = "Test Results",
    delete,
    path = "/api/test-results/{id}",
    params(("id" = i64, Path, description = "Test result ID")),
    responses((status = 204, description = "Test result deleted (idempotent)"))
)]
pub async fn delete_test_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.test_result_service.delete_test_result(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results/service/{service_id}",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Test results for the service, newest first", body = [TestResultResponse])
    )
)]
pub async fn get_test_results_by_service_id(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let results = state
        .test_result_service
        .get_test_results_by_service_id(service_id)
        .await?;
    let response: Vec<TestResultResponse> =
        results.into_iter().map(TestResultResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results/framework/{framework}",
    params(("framework" = String, Path, description = "Test framework")),
    responses(
        (status = 200, description = "Test results for the framework, newest first", body = [TestResultResponse])
    )
)]
pub async fn get_test_results_by_framework(
    State(state): State<Arc<AppState>>,
    Path(framework): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let results = state
        .test_result_service
        .get_test_results_by_framework(&framework)
        .await?;
    let response: Vec<TestResultResponse> =
        results.into_iter().map(TestResultResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results/type/{test_type}",
    params(("test_type" = String, Path, description = "Test type")),
    responses(
        (status = 200, description = "Test results of the given type, newest first", body = [TestResultResponse])
    )
)]
pub async fn get_test_results_by_type(
    State(state): State<Arc<AppState>>,
    Path(test_type): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let results = state
        .test_result_service
        .get_test_results_by_type(&test_type)
        .await?;
    let response: Vec<TestResultResponse> =
        results.into_iter().map(TestResultResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Test Results",
    get,
    path = "/api/test-results/service/{service_id}/stats",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Coverage and pass/fail aggregates", body = TestStats)
    )
)]
pub async fn get_test_stats_for_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let average_coverage = state
        .test_result_service
        .get_average_coverage_for_service(service_id)
        .await?;
    let total_passed = state
        .test_result_service
        .get_total_passed_for_service(service_id)
        .await?;
    let total_failed = state
        .test_result_service
        .get_total_failed_for_service(service_id)
        .await?;

    Ok(Json(TestStats {
        average_coverage,
        total_passed,
        total_failed,
    }))
}
