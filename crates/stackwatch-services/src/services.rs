use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Deserialize;
use stackwatch_core::{FieldViolations, Problem, ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::services;
use utoipa::ToSchema;

/// The status value that marks a service as active.
const STATUS_RUNNING: &str = "running";

/// Service payload, shared by create and update. Updates overwrite every
/// mutable column; omitted optional fields become NULL.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePayload {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub status: Option<String>,
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
}

impl ServicePayload {
    pub fn validate(&self) -> Result<(), Problem> {
        let mut violations = FieldViolations::new();
        violations.require("name", self.name.as_deref(), "Service name is required");
        violations.require(
            "type",
            self.service_type.as_deref(),
            "Service type is required",
        );
        violations.require(
            "status",
            self.status.as_deref(),
            "Service status is required",
        );
        violations.into_result()
    }
}

#[derive(Clone)]
pub struct MicroserviceService {
    db: Arc<DbConnection>,
}

impl MicroserviceService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// No defined order for services; insertion order is what the store gives.
    pub async fn get_all_services(&self) -> ServiceResult<Vec<services::Model>> {
        services::Entity::find()
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_service_by_id(&self, id: i64) -> ServiceResult<Option<services::Model>> {
        services::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create_service(&self, payload: ServicePayload) -> ServiceResult<services::Model> {
        let now = Utc::now();
        let service = services::ActiveModel {
            name: Set(payload.name.unwrap_or_default()),
            service_type: Set(payload.service_type.unwrap_or_default()),
            status: Set(payload.status.unwrap_or_default()),
            port: Set(payload.port),
            cpu: Set(payload.cpu),
            memory: Set(payload.memory),
            instances: Set(payload.instances),
            version: Set(payload.version),
            spring_boot_version: Set(payload.spring_boot_version),
            java_version: Set(payload.java_version),
            framework: Set(payload.framework),
            profiles: Set(payload.profiles),
            actuator_port: Set(payload.actuator_port),
            config: Set(payload.config),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        service
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Full-overwrite update; `updated_at` is refreshed, `created_at` kept.
    pub async fn update_service(
        &self,
        id: i64,
        payload: ServicePayload,
    ) -> ServiceResult<services::Model> {
        let existing = self
            .get_service_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service", id))?;

        let mut service: services::ActiveModel = existing.into();
        service.name = Set(payload.name.unwrap_or_default());
        service.service_type = Set(payload.service_type.unwrap_or_default());
        service.status = Set(payload.status.unwrap_or_default());
        service.port = Set(payload.port);
        service.cpu = Set(payload.cpu);
        service.memory = Set(payload.memory);
        service.instances = Set(payload.instances);
        service.version = Set(payload.version);
        service.spring_boot_version = Set(payload.spring_boot_version);
        service.java_version = Set(payload.java_version);
        service.framework = Set(payload.framework);
        service.profiles = Set(payload.profiles);
        service.actuator_port = Set(payload.actuator_port);
        service.config = Set(payload.config);
        service.updated_at = Set(Utc::now());

        service
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Idempotent: deleting a missing id is not an error. No cascade; records
    /// referencing this service keep their dangling ids.
    pub async fn delete_service(&self, id: i64) -> ServiceResult<()> {
        services::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }

    pub async fn get_services_by_type(&self, service_type: &str) -> ServiceResult<Vec<services::Model>> {
        services::Entity::find()
            .filter(services::Column::ServiceType.eq(service_type))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_services_by_status(&self, status: &str) -> ServiceResult<Vec<services::Model>> {
        services::Entity::find()
            .filter(services::Column::Status.eq(status))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_spring_boot_services(&self) -> ServiceResult<Vec<services::Model>> {
        services::Entity::find()
            .filter(services::Column::SpringBootVersion.is_not_null())
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_active_service_count(&self) -> ServiceResult<u64> {
        services::Entity::find()
            .filter(services::Column::Status.eq(STATUS_RUNNING))
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_service_count(&self) -> ServiceResult<u64> {
        services::Entity::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Substring containment search (`LIKE %name%`); case sensitivity follows
    /// the store collation.
    pub async fn search_services_by_name(&self, name: &str) -> ServiceResult<Vec<services::Model>> {
        services::Entity::find()
            .filter(services::Column::Name.contains(name))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwatch_database::test_utils::TestDatabase;

    fn payload(name: &str, status: &str) -> ServicePayload {
        ServicePayload {
            name: Some(name.to_string()),
            service_type: Some("core".to_string()),
            status: Some(status.to_string()),
            port: Some(8080),
            instances: Some(1),
            ..Default::default()
        }
    }

    async fn setup() -> (TestDatabase, MicroserviceService) {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let service = MicroserviceService::new(test_db.db.clone());
        (test_db, service)
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let (_db, service) = setup().await;

        let first = service
            .create_service(payload("order-service", "running"))
            .await
            .unwrap();
        let second = service
            .create_service(payload("payment-service", "stopped"))
            .await
            .unwrap();

        assert!(first.id > 0);
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn update_overwrites_all_mutable_fields() {
        let (_db, service) = setup().await;

        let created = service
            .create_service(ServicePayload {
                framework: Some("spring-boot".to_string()),
                spring_boot_version: Some("3.2.0".to_string()),
                ..payload("order-service", "running")
            })
            .await
            .unwrap();

        // Partial payload: omitted optional fields are nulled out
        let updated = service
            .update_service(created.id, payload("order-service-v2", "stopped"))
            .await
            .unwrap();

        assert_eq!(updated.name, "order-service-v2");
        assert_eq!(updated.status, "stopped");
        assert!(updated.framework.is_none());
        assert!(updated.spring_boot_version.is_none());
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (_db, service) = setup().await;

        let err = service
            .update_service(12345, payload("ghost", "running"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(service.get_service_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_db, service) = setup().await;

        service.delete_service(999).await.unwrap();

        let created = service
            .create_service(payload("order-service", "running"))
            .await
            .unwrap();
        service.delete_service(created.id).await.unwrap();
        service.delete_service(created.id).await.unwrap();
        assert_eq!(service.get_service_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn active_count_is_running_only() {
        let (_db, service) = setup().await;

        service
            .create_service(payload("a", "running"))
            .await
            .unwrap();
        service
            .create_service(payload("b", "running"))
            .await
            .unwrap();
        service
            .create_service(payload("c", "stopped"))
            .await
            .unwrap();

        assert_eq!(service.get_active_service_count().await.unwrap(), 2);
        assert_eq!(service.get_service_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn search_matches_on_containment() {
        let (_db, service) = setup().await;

        service
            .create_service(payload("order-service", "running"))
            .await
            .unwrap();
        service
            .create_service(payload("payment-service", "running"))
            .await
            .unwrap();

        let matches = service.search_services_by_name("order").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "order-service");

        let matches = service.search_services_by_name("service").await.unwrap();
        assert_eq!(matches.len(), 2);

        let matches = service.search_services_by_name("gateway").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn spring_boot_filter_checks_version_presence() {
        let (_db, service) = setup().await;

        service
            .create_service(ServicePayload {
                spring_boot_version: Some("3.2.0".to_string()),
                ..payload("boot-service", "running")
            })
            .await
            .unwrap();
        service
            .create_service(payload("plain-service", "running"))
            .await
            .unwrap();

        let boot = service.get_spring_boot_services().await.unwrap();
        assert_eq!(boot.len(), 1);
        assert_eq!(boot[0].name, "boot-service");
    }

    #[test]
    fn validation_lists_every_missing_field() {
        let err = ServicePayload::default().validate().unwrap_err();
        let errors = err.body.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 3);

        assert!(payload("order-service", "running").validate().is_ok());
    }
}
