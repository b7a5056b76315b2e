use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait,
    ActiveValue::Set,
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use stackwatch_core::{ServiceError, ServiceResult};
use stackwatch_database::DbConnection;
use stackwatch_entities::metrics;
use utoipa::ToSchema;

/// Metric snapshot payload. Every field is optional; snapshots are
/// write-once, so there is no update counterpart.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricPayload {
    pub service_id: Option<i64>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub request_count: Option<i32>,
    pub response_time: Option<f64>,
    pub error_rate: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct AvgRow {
    value: Option<f64>,
}

#[derive(Clone)]
pub struct MetricService {
    db: Arc<DbConnection>,
}

impl MetricService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    pub async fn get_all_metrics(&self) -> ServiceResult<Vec<metrics::Model>> {
        metrics::Entity::find()
            .order_by_desc(metrics::Column::Timestamp)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_metrics_by_service_id(
        &self,
        service_id: i64,
    ) -> ServiceResult<Vec<metrics::Model>> {
        metrics::Entity::find()
            .filter(metrics::Column::ServiceId.eq(service_id))
            .order_by_desc(metrics::Column::Timestamp)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Snapshots whose timestamp falls within the last `hours` hours.
    pub async fn get_recent_metrics(&self, hours: i64) -> ServiceResult<Vec<metrics::Model>> {
        let since = Utc::now() - Duration::hours(hours);
        metrics::Entity::find()
            .filter(metrics::Column::Timestamp.gte(since))
            .order_by_desc(metrics::Column::Timestamp)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_service_metrics_since(
        &self,
        service_id: i64,
        hours: i64,
    ) -> ServiceResult<Vec<metrics::Model>> {
        let since = Utc::now() - Duration::hours(hours);
        metrics::Entity::find()
            .filter(metrics::Column::ServiceId.eq(service_id))
            .filter(metrics::Column::Timestamp.gte(since))
            .order_by_desc(metrics::Column::Timestamp)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_metric_by_id(&self, id: i64) -> ServiceResult<Option<metrics::Model>> {
        metrics::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create_metric(&self, payload: MetricPayload) -> ServiceResult<metrics::Model> {
        let metric = metrics::ActiveModel {
            service_id: Set(payload.service_id),
            cpu: Set(payload.cpu),
            memory: Set(payload.memory),
            request_count: Set(payload.request_count),
            response_time: Set(payload.response_time),
            error_rate: Set(payload.error_rate),
            timestamp: Set(Utc::now()),
            ..Default::default()
        };

        metric
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_metric(&self, id: i64) -> ServiceResult<()> {
        metrics::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(())
    }

    /// AVG(cpu); `None` when the service has no snapshots.
    pub async fn get_average_cpu_for_service(
        &self,
        service_id: i64,
    ) -> ServiceResult<Option<f64>> {
        self.average_column(metrics::Column::Cpu, service_id).await
    }

    pub async fn get_average_memory_for_service(
        &self,
        service_id: i64,
    ) -> ServiceResult<Option<f64>> {
        self.average_column(metrics::Column::Memory, service_id).await
    }

    async fn average_column(
        &self,
        column: metrics::Column,
        service_id: i64,
    ) -> ServiceResult<Option<f64>> {
        let row = metrics::Entity::find()
            .select_only()
            .expr_as(Func::avg(Expr::col(column)), "value")
            .filter(metrics::Column::ServiceId.eq(service_id))
            .into_model::<AvgRow>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.value))
    }
}
