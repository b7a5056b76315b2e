//! Core types shared across all stackwatch crates

pub mod error;
pub mod problemdetails;
pub mod types;
pub mod validation;

pub use error::{ServiceError, ServiceResult};
pub use problemdetails::Problem;
pub use types::UtcDateTime;
pub use validation::{FieldViolation, FieldViolations};
