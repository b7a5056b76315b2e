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
use stackwatch_entities::activities;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::services::{ActivityPayload, ActivityService};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_activities,
        get_activity_by_id,
        create_activity,
        update_activity,
        delete_activity,
        get_activities_by_service_id,
        get_activities_by_type,
        get_activities_by_severity,
        get_activities_by_type_and_service
    ),
    components(schemas(ActivityResponse, ActivityPayload)),
    info(
        title = "Activities API",
        description = "Activity log for the simulated services, filterable by \
        service, type, and severity.",
        version = "1.0.0"
    )
)]
pub struct ActivitiesApiDoc;

pub struct AppState {
    pub activity_service: Arc<ActivityService>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/activities",
            get(get_all_activities).post(create_activity),
        )
        .route(
            "/api/activities/{id}",
            get(get_activity_by_id)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route(
            "/api/activities/service/{service_id}",
            get(get_activities_by_service_id),
        )
        .route("/api/activities/type/{type}", get(get_activities_by_type))
        .route(
            "/api/activities/severity/{severity}",
            get(get_activities_by_severity),
        )
        .route(
            "/api/activities/service/{service_id}/type/{type}",
            get(get_activities_by_type_and_service),
        )
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub message: String,
    pub service_id: Option<i64>,
    pub severity: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
}

impl From<activities::Model> for ActivityResponse {
    fn from(model: activities::Model) -> Self {
        Self {
            id: model.id,
            activity_type: model.activity_type,
            message: model.message,
            service_id: model.service_id,
            severity: model.severity,
            created_at: model.created_at,
        }
    }
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities",
    responses(
        (status = 200, description = "All activities, newest first", body = [ActivityResponse])
    )
)]
pub async fn get_all_activities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Problem> {
    let activities = state.activity_service.get_all_activities().await?;
    let response: Vec<ActivityResponse> =
        activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity details", body = ActivityResponse),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn get_activity_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    match state.activity_service.get_activity_by_id(id).await? {
        Some(activity) => Ok(Json(ActivityResponse::from(activity)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    tag = "Activities",
    post,
    path = "/api/activities",
    request_body = ActivityPayload,
    responses(
        (status = 201, description = "Activity recorded", body = ActivityResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActivityPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    debug!("Recording {:?} activity", payload.activity_type);
    let created = state.activity_service.create_activity(payload).await?;
    Ok((StatusCode::CREATED, Json(ActivityResponse::from(created))))
}

#[utoipa::path(
    tag = "Activities",
    put,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity ID")),
    request_body = ActivityPayload,
    responses(
        (status = 200, description = "Activity updated", body = ActivityResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ActivityPayload>,
) -> Result<impl IntoResponse, Problem> {
    payload.validate()?;

    match state.activity_service.update_activity(id, payload).await {
        Ok(updated) => Ok(Json(ActivityResponse::from(updated)).into_response()),
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    tag = "Activities",
    delete,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity ID")),
    responses((status = 204, description = "Activity deleted (idempotent)"))
)]
pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    state.activity_service.delete_activity(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities/service/{service_id}",
    params(("service_id" = i64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Activities for the service, newest first", body = [ActivityResponse])
    )
)]
pub async fn get_activities_by_service_id(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<i64>,
) -> Result<impl IntoResponse, Problem> {
    let activities = state
        .activity_service
        .get_activities_by_service_id(service_id)
        .await?;
    let response: Vec<ActivityResponse> =
        activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities/type/{type}",
    params(("type" = String, Path, description = "Activity type")),
    responses(
        (status = 200, description = "Activities of the given type, newest first", body = [ActivityResponse])
    )
)]
pub async fn get_activities_by_type(
    State(state): State<Arc<AppState>>,
    Path(activity_type): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let activities = state
        .activity_service
        .get_activities_by_type(&activity_type)
        .await?;
    let response: Vec<ActivityResponse> =
        activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities/severity/{severity}",
    params(("severity" = String, Path, description = "Activity severity")),
    responses(
        (status = 200, description = "Activities with the given severity, newest first", body = [ActivityResponse])
    )
)]
pub async fn get_activities_by_severity(
    State(state): State<Arc<AppState>>,
    Path(severity): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let activities = state
        .activity_service
        .get_activities_by_severity(&severity)
        .await?;
    let response: Vec<ActivityResponse> =
        activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    tag = "Activities",
    get,
    path = "/api/activities/service/{service_id}/type/{type}",
    params(
        ("service_id" = i64, Path, description = "Service ID"),
        ("type" = String, Path, description = "Activity type")
    ),
    responses(
        (status = 200, description = "Activities matching both service and type", body = [ActivityResponse])
    )
)]
pub async fn get_activities_by_type_and_service(
    State(state): State<Arc<AppState>>,
    Path((service_id, activity_type)): Path<(i64, String)>,
) -> Result<impl IntoResponse, Problem> {
    let activities = state
        .activity_service
        .get_activities_by_type_and_service(&activity_type, service_id)
        .await?;
    let response: Vec<ActivityResponse> =
        activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}
