use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use clap::Args;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::actuator::{self, ActuatorState};

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8080", env = "STACKWATCH_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(
        long,
        default_value = "sqlite://stackwatch.db?mode=rwc",
        env = "STACKWATCH_DATABASE_URL"
    )]
    pub database_url: String,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.serve())
    }

    async fn serve(self) -> anyhow::Result<()> {
        debug!("Initializing database connection...");
        let db = stackwatch_database::establish_connection(&self.database_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", self.database_url, e))?;

        let app = build_router(db);

        let listener = TcpListener::bind(&self.address).await?;
        info!("Stackwatch API server listening on {}", self.address);

        axum::serve(listener, app).into_future().await?;
        info!("Stackwatch API server exited");
        Ok(())
    }
}

fn create_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = stackwatch_services::ServicesApiDoc::openapi();
    doc.merge(stackwatch_deployments::DeploymentsApiDoc::openapi());
    doc.merge(stackwatch_activities::ActivitiesApiDoc::openapi());
    doc.merge(stackwatch_testing::TestResultsApiDoc::openapi());
    doc.merge(stackwatch_gateway::RoutesApiDoc::openapi());
    doc.merge(stackwatch_metrics::MetricsApiDoc::openapi());
    doc
}

/// Explicit composition root: one service and one router per vertical,
/// all sharing the same connection pool.
pub fn build_router(db: Arc<stackwatch_database::DbConnection>) -> Router {
    let microservice_service = Arc::new(stackwatch_services::MicroserviceService::new(db.clone()));
    let metric_service = Arc::new(stackwatch_metrics::MetricService::new(db.clone()));

    let services_state = Arc::new(stackwatch_services::AppState {
        microservice_service: microservice_service.clone(),
    });
    let deployments_state = Arc::new(stackwatch_deployments::AppState {
        deployment_service: Arc::new(stackwatch_deployments::DeploymentService::new(db.clone())),
    });
    let activities_state = Arc::new(stackwatch_activities::AppState {
        activity_service: Arc::new(stackwatch_activities::ActivityService::new(db.clone())),
    });
    let testing_state = Arc::new(stackwatch_testing::AppState {
        test_result_service: Arc::new(stackwatch_testing::TestResultService::new(db.clone())),
    });
    let gateway_state = Arc::new(stackwatch_gateway::AppState {
        api_route_service: Arc::new(stackwatch_gateway::ApiRouteService::new(db.clone())),
    });
    let metrics_state = Arc::new(stackwatch_metrics::AppState {
        metric_service: metric_service.clone(),
    });
    let actuator_state = Arc::new(ActuatorState {
        microservice_service,
        metric_service,
    });

    debug!("Merging vertical routers");
    Router::new()
        .merge(stackwatch_services::configure_routes().with_state(services_state))
        .merge(stackwatch_deployments::configure_routes().with_state(deployments_state))
        .merge(stackwatch_activities::configure_routes().with_state(activities_state))
        .merge(stackwatch_testing::configure_routes().with_state(testing_state))
        .merge(stackwatch_gateway::configure_routes().with_state(gateway_state))
        .merge(stackwatch_metrics::configure_routes().with_state(metrics_state))
        .merge(actuator::configure_routes().with_state(actuator_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", create_openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use stackwatch_database::test_utils::TestDatabase;
    use tower::ServiceExt;

    #[tokio::test]
    async fn merged_router_serves_every_vertical() {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let app = build_router(test_db.db.clone());

        for uri in [
            "/api/services",
            "/api/deployments",
            "/api/activities",
            "/api/test-results",
            "/api/routes",
            "/api/metrics",
            "/actuator/health",
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn openapi_document_merges_all_verticals() {
        let doc = create_openapi();
        let json = serde_json::to_value(doc).unwrap();
        let paths = json["paths"].as_object().unwrap();

        for path in [
            "/api/services/stats",
            "/api/deployments/stats",
            "/api/activities/{id}",
            "/api/test-results/service/{service_id}/stats",
            "/api/routes/active",
            "/api/metrics/latest",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn create_flows_through_the_merged_router() {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let app = build_router(test_db.db.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/services")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"name": "payments", "type": "core", "status": "running"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // The actuator health component sees the new running service
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/actuator/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health["components"]["services"]["status"], "UP");
        assert_eq!(
            health["components"]["services"]["details"]["activeServices"],
            1
        );
    }
}
