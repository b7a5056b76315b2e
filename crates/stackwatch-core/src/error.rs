//! Common error types used across all stackwatch services

use thiserror::Error;

/// Common service error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

impl ServiceError {
    /// Build a `NotFound` for an entity identified by a numeric id.
    pub fn not_found(entity: &str, id: i64) -> Self {
        ServiceError::NotFound {
            resource: format!("{} with id {}", entity, id),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
