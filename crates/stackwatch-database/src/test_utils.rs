//! Test utilities shared by the vertical crates.
//!
//! Tests run against an in-memory sqlite database with the full schema
//! applied, so the suite needs no external services.

use crate::DbConnection;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use stackwatch_migrations::Migrator;
use std::sync::Arc;

/// A fresh, fully-migrated in-memory database.
pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    pub async fn with_migrations() -> anyhow::Result<Self> {
        // A pooled sqlite :memory: handle gets a separate database per
        // connection; pin the pool to one connection.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);

        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn migrations_create_all_tables() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;

        for table in [
            "services",
            "deployments",
            "activities",
            "test_results",
            "api_routes",
            "metrics",
        ] {
            let stmt = Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                format!("SELECT COUNT(*) FROM {}", table),
            );
            let result = test_db.db.query_one(stmt).await?;
            assert!(result.is_some(), "table {} missing", table);
        }

        Ok(())
    }
}
