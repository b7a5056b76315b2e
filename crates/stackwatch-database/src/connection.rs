//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use stackwatch_core::{ServiceError, ServiceResult};
use stackwatch_migrations::Migrator;
use std::sync::Arc;

pub type DbConnection = DatabaseConnection;

/// Connect to the store and bring the schema up to date.
pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(100).min_connections(5);

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Ok(Arc::new(db))
}
