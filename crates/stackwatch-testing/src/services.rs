use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait,
    ActiveValue::Set,
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use stackwatch_core::{FieldViolations, Problem, ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::test_results;
use utoipa::ToSchema;

/// Test result payload, shared by create and update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TestResultPayload {
    pub framework: Option<String>,
    pub test_type: Option<String>,
    pub service_id: Option<i64>,
    pub passed: Option<i32>,
    pub failed: Option<i32>,
    pub coverage: Option<f64>,
    pub duration: Option<i32>,
}

impl TestResultPayload {
    pub fn validate(&self) -> Result<(), Problem> {
        let mut violations = FieldViolations::new();
        violations.require("framework", self.framework.as_deref(), "Framework is required");
        violations.require("testType", self.test_type.as_deref(), "Test type is required");
        violations.into_result()
    }
}

// Aggregates come back as single-column rows; Option keeps SQL NULL (no
// matching rows) distinct from a zero result.
#[derive(Debug, FromQueryResult)]
struct AvgRow {
    value: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    value: Option<i64>,
}

#[derive(Clone)]
pub struct TestResultService {
    db: Arc<DbConnection>,
}

impl TestResultService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    pub async fn get_all_test_results(&self) -> ServiceResult<Vec<test_results::Model>> {
        test_results::Entity::find()
            .order_by_desc(test_results::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_test_results_by_service_id(
        &self,
        service_id: i64,
    ) -> ServiceResult<Vec<test_results::Model>> {
        test_results::Entity::find()
            .filter(test_results::Column::ServiceId.eq(service_id))
            .order_by_desc(test_results::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_test_results_by_framework(
        &self,
        framework: &str,
    ) -> ServiceResult<Vec<test_results::Model>> {
        test_results::Entity::find()
            .filter(test_results::Column::Framework.eq(framework))
            .order_by_desc(test_results::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_test_results_by_type(
        &self,
        test_type: &str,
    ) -> ServiceResult<Vec<test_results::Model>> {
        test_results::Entity::find()
            .filter(test_results::Column::TestType.eq(test_type))
            .order_by_desc(test_results::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_test_result_by_id(
        &self,
        id: i64,
    ) -> ServiceResult<Option<test_results::Model>> {
        test_results::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create_test_result(
        &self,
        payload: TestResultPayload,
    ) -> ServiceResult<test_results::Model> {
        let test_result = test_results::ActiveModel {
            framework: Set(payload.framework.unwrap_or_default()),
            test_type: Set(payload.test_type.unwrap_or_default()),
            service_id: Set(payload.service_id),
            passed: Set(payload.passed),
            failed: Set(payload.failed),
            coverage: Set(payload.coverage),
            duration: Set(payload.duration),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        test_result
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Full overwrite of the mutable columns; `created_at` is kept.
    pub async fn update_test_result(
        &self,
        id: i64,
        payload: TestResultPayload,
    ) -> ServiceResult<test_results::Model> {
        let existing = self
            .get_test_result_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Test result", id))?;

        let mut test_result: test_results::ActiveModel = existing.into();
        test_result.framework = Set(payload.framework.unwrap_or_default());
        test_result.test_type = Set(payload.test_type.unwrap_or_default());
        test_result.service_id = Set(payload.service_id);
        test_result.passed = Set(payload.passed);
        test_result.failed = Set(payload.failed);
        test_result.coverage = Set(payload.coverage);
        test_result.duration = Set(payload.duration);

        test_result
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_test_result(&self, id: i64) -> ServiceResult<()> {
        test_results::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }

    /// AVG(coverage); `None` when the service has no test results.
    pub async fn get_average_coverage_for_service(
        &self,
        service_id: i64,
    ) -> ServiceResult<Option<f64>> {
        let row = test_results::Entity::find()
            .select_only()
            .expr_as(
                Func::avg(Expr::col(test_results::Column::Coverage)),
                "value",
            )
            .filter(test_results::Column::ServiceId.eq(service_id))
            .into_model::<AvgRow>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.value))
    }

    pub async fn get_total_passed_for_service(
        &self,
        service_id: i64,
    ) -> ServiceResult<Option<i64>> {
        self.sum_column(test_results::Column::Passed, service_id).await
    }

    pub async fn get_total_failed_for_service(
        &self,
        service_id: i64,
    ) -> ServiceResult<Option<i64>> {
        self.sum_column(test_results::Column::Failed, service_id).await
    }

    async fn sum_column(
        &self,
        column: test_results::Column,
        service_id: i64,
    ) -> ServiceResult<Option<i64>> {
        let row = test_results::Entity::find()
            .select_only()
            .expr_as(Func::sum(Expr::col(column)), "value")
            .filter(test_results::Column::ServiceId.eq(service_id))
            .into_model::<SumRow>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use stackwatch_database::test_utils::TestDatabase;

    fn payload(framework: &str, service_id: Option<i64>) -> TestResultPayload {
        TestResultPayload {
            framework: Some(framework.to_string()),
            test_type: Some("unit".to_string()),
            service_id,
            passed: Some(10),
            failed: Some(2),
            coverage: Some(80.0),
            duration: Some(45),
        }
    }

    async fn setup() -> (TestDatabase, TestResultService) {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let service = TestResultService::new(test_db.db.clone());
        (test_db, service)
    }

    #[tokio::test]
    async fn aggregates_are_none_without_rows() {
        let (_db, service) = setup().await;

        assert!(service
            .get_average_coverage_for_service(1)
            .await
            .unwrap()
            .is_none());
        assert!(service.get_total_passed_for_service(1).await.unwrap().is_none());
        assert!(service.get_total_failed_for_service(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn aggregates_scope_to_the_service() {
        let (_db, service) = setup().await;

        service
            .create_test_result(TestResultPayload {
                coverage: Some(70.0),
                passed: Some(8),
                failed: Some(1),
                ..payload("junit", Some(1))
            })
            .await
            .unwrap();
        service
            .create_test_result(TestResultPayload {
                coverage: Some(90.0),
                passed: Some(12),
                failed: Some(3),
                ..payload("junit", Some(1))
            })
            .await
            .unwrap();
        // A different service's run must not bleed into service 1's stats
        service
            .create_test_result(TestResultPayload {
                coverage: Some(10.0),
                passed: Some(100),
                failed: Some(100),
                ..payload("junit", Some(2))
            })
            .await
            .unwrap();

        let avg = service.get_average_coverage_for_service(1).await.unwrap();
        assert_eq!(avg, Some(80.0));
        assert_eq!(
            service.get_total_passed_for_service(1).await.unwrap(),
            Some(20)
        );
        assert_eq!(
            service.get_total_failed_for_service(1).await.unwrap(),
            Some(4)
        );
    }

    #[tokio::test]
    async fn filters_by_framework_and_type() {
        let (_db, service) = setup().await;

        service
            .create_test_result(payload("junit", Some(1)))
            .await
            .unwrap();
        service
            .create_test_result(TestResultPayload {
                test_type: Some("integration".to_string()),
                ..payload("testng", Some(1))
            })
            .await
            .unwrap();

        let junit = service.get_test_results_by_framework("junit").await.unwrap();
        assert_eq!(junit.len(), 1);
        assert_eq!(junit[0].framework, "junit");

        let integration = service.get_test_results_by_type("integration").await.unwrap();
        assert_eq!(integration.len(), 1);
        assert_eq!(integration[0].framework, "testng");
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (_db, service) = setup().await;

        let err = service
            .update_test_result(42, payload("junit", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_overwrites_optional_counters() {
        let (_db, service) = setup().await;

        let created = service
            .create_test_result(payload("junit", Some(1)))
            .await
            .unwrap();

        let updated = service
            .update_test_result(
                created.id,
                TestResultPayload {
                    framework: Some("junit".to_string()),
                    test_type: Some("unit".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.passed.is_none());
        assert!(updated.failed.is_none());
        assert!(updated.coverage.is_none());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_db, service) = setup().await;

        service.delete_test_result(55).await.unwrap();

        let created = service
            .create_test_result(payload("junit", None))
            .await
            .unwrap();
        service.delete_test_result(created.id).await.unwrap();
        service.delete_test_result(created.id).await.unwrap();
        assert!(service.get_all_test_results().await.unwrap().is_empty());
    }

    #[test]
    fn validation_requires_framework_and_type() {
        let err = TestResultPayload::default().validate().unwrap_err();
        let errors = err.body.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 2);

        assert!(payload("junit", None).validate().is_ok());
    }
}
