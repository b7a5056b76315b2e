//! Simulated actuator surface under `/actuator/*`.
//!
//! The payloads imitate a management endpoint: fixed identity and build
//! blocks, synthetic runtime gauges, and a health component derived from
//! the live active-service count.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use stackwatch_core::Problem;
use stackwatch_metrics::MetricService;
use stackwatch_services::MicroserviceService;

pub struct ActuatorState {
    pub microservice_service: Arc<MicroserviceService>,
    pub metric_service: Arc<MetricService>,
}

pub fn configure_routes() -> Router<Arc<ActuatorState>> {
    Router::new()
        .route("/actuator/health", get(health))
        .route("/actuator/info", get(info))
        .route("/actuator/metrics", get(metrics))
        .route("/actuator/env", get(env))
}

async fn health(State(state): State<Arc<ActuatorState>>) -> Result<impl IntoResponse, Problem> {
    let active_services = state.microservice_service.get_active_service_count().await?;

    Ok(Json(json!({
        "status": "UP",
        "timestamp": Utc::now(),
        "components": {
            "db": {
                "status": "UP",
                "details": {
                    "database": "sqlite",
                    "validationQuery": "SELECT 1"
                }
            },
            "diskSpace": {
                "status": "UP",
                "details": {
                    "total": 1_000_000_000u64,
                    "free": 800_000_000u64,
                    "threshold": 10_485_760u64
                }
            },
            "services": {
                "status": if active_services > 0 { "UP" } else { "DOWN" },
                "details": {
                    "activeServices": active_services
                }
            }
        }
    })))
}

async fn info() -> impl IntoResponse {
    Json(json!({
        "app": {
            "name": "Stackwatch",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Microservices architecture dashboard backend",
            "encoding": "UTF-8"
        },
        "build": {
            "artifact": "stackwatch",
            "group": "io.stackwatch",
            "name": "stackwatch",
            "version": env!("CARGO_PKG_VERSION"),
            "time": Utc::now()
        },
        "git": {
            "branch": "main",
            "commit": {
                "id": "abc123def456",
                "time": Utc::now()
            }
        }
    }))
}

async fn metrics(State(state): State<Arc<ActuatorState>>) -> Result<impl IntoResponse, Problem> {
    let active_services = state.microservice_service.get_active_service_count().await?;
    let total_services = state.microservice_service.get_service_count().await?;
    let metric_count = state.metric_service.get_all_metrics().await?.len();

    // Runtime gauges are synthetic; only the application block is live
    Ok(Json(json!({
        "runtime": {
            "memory.used": 268_435_456u64,
            "memory.free": 268_435_456u64,
            "memory.total": 536_870_912u64,
            "memory.max": 1_073_741_824u64,
            "threads.peak": 16,
            "threads.daemon": 8
        },
        "http": {
            "server.requests": 1000,
            "server.requests.active": 5
        },
        "application": {
            "services.active": active_services,
            "services.total": total_services,
            "metrics.count": metric_count
        }
    })))
}

async fn env() -> impl IntoResponse {
    Json(json!({
        "activeProfiles": ["production"],
        "applicationConfig": {
            "server.port": 8080,
            "application.name": "stackwatch",
            "profiles.active": "production",
            "management.endpoints.exposure.include": "*",
            "management.endpoint.health.show-details": "always"
        },
        "systemProperties": {
            "os.name": std::env::consts::OS,
            "os.arch": std::env::consts::ARCH,
            "rust.profile": if cfg!(debug_assertions) { "debug" } else { "release" }
        }
    }))
}
