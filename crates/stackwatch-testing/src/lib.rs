//! Test-result vertical, served under `/api/test-results`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, AppState, TestResultsApiDoc};
pub use services::{TestResultPayload, TestResultService};
