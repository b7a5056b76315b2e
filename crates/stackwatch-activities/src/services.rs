use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Deserialize;
use stackwatch_core::{FieldViolations, Problem, ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::activities;
use utoipa::ToSchema;

/// Activity payload, shared by create and update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityPayload {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub message: Option<String>,
    pub service_id: Option<i64>,
    pub severity: Option<String>,
}

impl ActivityPayload {
    pub fn validate(&self) -> Result<(), Problem> {
        let mut violations = FieldViolations::new();
        violations.require("type", self.activity_type.as_deref(), "Type is required");
        violations.require("message", self.message.as_deref(), "Message is required");
        violations.into_result()
    }
}

#[derive(Clone)]
pub struct ActivityService {
    db: Arc<DbConnection>,
}

impl ActivityService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    pub async fn get_all_activities(&self) -> ServiceResult<Vec<activities::Model>> {
        activities::Entity::find()
            .order_by_desc(activities::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_activities_by_service_id(
        &self,
        service_id: i64,
    ) -> ServiceResult<Vec<activities::Model>> {
        activities::Entity::find()
            .filter(activities::Column::ServiceId.eq(service_id))
            .order_by_desc(activities::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_activities_by_type(
        &self,
        activity_type: &str,
    ) -> ServiceResult<Vec<activities::Model>> {
        activities::Entity::find()
            .filter(activities::Column::ActivityType.eq(activity_type))
            .order_by_desc(activities::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_activities_by_severity(
        &self,
        severity: &str,
    ) -> ServiceResult<Vec<activities::Model>> {
        activities::Entity::find()
            .filter(activities::Column::Severity.eq(severity))
            .order_by_desc(activities::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Combined filter; unordered, unlike the single-column lists.
    pub async fn get_activities_by_type_and_service(
        &self,
        activity_type: &str,
        service_id: i64,
    ) -> ServiceResult<Vec<activities::Model>> {
        activities::Entity::find()
            .filter(activities::Column::ActivityType.eq(activity_type))
            .filter(activities::Column::ServiceId.eq(service_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_activity_by_id(&self, id: i64) -> ServiceResult<Option<activities::Model>> {
        activities::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create_activity(
        &self,
        payload: ActivityPayload,
    ) -> ServiceResult<activities::Model> {
        let activity = activities::ActiveModel {
            activity_type: Set(payload.activity_type.unwrap_or_default()),
            message: Set(payload.message.unwrap_or_default()),
            service_id: Set(payload.service_id),
            severity: Set(payload.severity),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        activity
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Full overwrite of the mutable columns; `created_at` is kept.
    pub async fn update_activity(
        &self,
        id: i64,
        payload: ActivityPayload,
    ) -> ServiceResult<activities::Model> {
        let existing = self
            .get_activity_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Activity", id))?;

        let mut activity: activities::ActiveModel = existing.into();
        activity.activity_type = Set(payload.activity_type.unwrap_or_default());
        activity.message = Set(payload.message.unwrap_or_default());
        activity.service_id = Set(payload.service_id);
        activity.severity = Set(payload.severity);

        activity
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_activity(&self, id: i64) -> ServiceResult<()> {
        activities::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use stackwatch_database::test_utils::TestDatabase;

    fn payload(activity_type: &str, message: &str, service_id: Option<i64>) -> ActivityPayload {
        ActivityPayload {
            activity_type: Some(activity_type.to_string()),
            message: Some(message.to_string()),
            service_id,
            severity: Some("info".to_string()),
        }
    }

    async fn setup() -> (TestDatabase, ActivityService) {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let service = ActivityService::new(test_db.db.clone());
        (test_db, service)
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_db, service) = setup().await;

        let first = service
            .create_activity(payload("deploy", "first", None))
            .await
            .unwrap();
        let second = service
            .create_activity(payload("deploy", "second", None))
            .await
            .unwrap();

        let all = service.get_all_activities().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);
        assert!(all.iter().any(|a| a.id == first.id));
        assert!(all.iter().any(|a| a.id == second.id));
    }

    #[tokio::test]
    async fn filters_combine_type_and_service() {
        let (_db, service) = setup().await;

        service
            .create_activity(payload("deploy", "svc 1 deploy", Some(1)))
            .await
            .unwrap();
        service
            .create_activity(payload("deploy", "svc 2 deploy", Some(2)))
            .await
            .unwrap();
        service
            .create_activity(payload("alert", "svc 1 alert", Some(1)))
            .await
            .unwrap();

        let matches = service
            .get_activities_by_type_and_service("deploy", 1)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].message, "svc 1 deploy");

        assert_eq!(service.get_activities_by_type("deploy").await.unwrap().len(), 2);
        assert_eq!(
            service.get_activities_by_service_id(1).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn severity_filter_skips_null_rows() {
        let (_db, service) = setup().await;

        service
            .create_activity(ActivityPayload {
                severity: None,
                ..payload("alert", "no severity", None)
            })
            .await
            .unwrap();
        service
            .create_activity(ActivityPayload {
                severity: Some("error".to_string()),
                ..payload("alert", "bad", None)
            })
            .await
            .unwrap();

        let errors = service.get_activities_by_severity("error").await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "bad");
    }

    #[tokio::test]
    async fn update_overwrites_and_keeps_created_at() {
        let (_db, service) = setup().await;

        let created = service
            .create_activity(payload("deploy", "rolling out", Some(3)))
            .await
            .unwrap();

        let updated = service
            .update_activity(
                created.id,
                ActivityPayload {
                    activity_type: Some("deploy".to_string()),
                    message: Some("rolled out".to_string()),
                    service_id: None,
                    severity: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.message, "rolled out");
        assert!(updated.service_id.is_none());
        assert!(updated.severity.is_none());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (_db, service) = setup().await;

        let err = service
            .update_activity(777, payload("deploy", "ghost", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_db, service) = setup().await;

        service.delete_activity(999_999).await.unwrap();

        let created = service
            .create_activity(payload("deploy", "to delete", None))
            .await
            .unwrap();
        service.delete_activity(created.id).await.unwrap();
        service.delete_activity(created.id).await.unwrap();
        assert!(service.get_all_activities().await.unwrap().is_empty());
    }

    #[test]
    fn validation_requires_type_and_message() {
        let err = ActivityPayload::default().validate().unwrap_err();
        let errors = err.body.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 2);

        assert!(payload("deploy", "ok", None).validate().is_ok());
    }
}
