//! Request payload validation for the API boundary.
//!
//! Handlers run these checks before dispatching to the service layer and
//! report every violated field at once, so a payload missing two required
//! strings gets both messages back in a single 400.

use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::problemdetails::{self, Problem};

/// A single violated constraint on a request payload field.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Accumulator for payload validation.
#[derive(Debug, Default)]
pub struct FieldViolations {
    violations: Vec<FieldViolation>,
}

impl FieldViolations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation unless `value` holds a non-blank string.
    pub fn require(&mut self, field: &str, value: Option<&str>, message: &str) {
        if value.map(str::trim).unwrap_or_default().is_empty() {
            self.violations.push(FieldViolation {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Finish validation, turning any collected violations into a 400 problem.
    pub fn into_result(self) -> Result<(), Problem> {
        if self.violations.is_empty() {
            return Ok(());
        }

        Err(problemdetails::new(StatusCode::BAD_REQUEST)
            .with_title("Validation Failed")
            .with_value(
                "errors",
                serde_json::to_value(&self.violations).unwrap_or_default(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_blank_values() {
        let mut violations = FieldViolations::new();
        violations.require("name", Some("payments"), "Name is required");
        assert!(violations.into_result().is_ok());
    }

    #[test]
    fn rejects_missing_and_blank_values() {
        let mut violations = FieldViolations::new();
        violations.require("name", None, "Name is required");
        violations.require("status", Some("   "), "Status is required");
        let problem = violations.into_result().unwrap_err();
        assert_eq!(problem.status_code, StatusCode::BAD_REQUEST);

        let errors = problem.body.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["message"], "Status is required");
    }
}
