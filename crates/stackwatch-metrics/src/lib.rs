//! Metrics-snapshot vertical, served under `/api/metrics`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, AppState, MetricsApiDoc};
pub use services::{MetricPayload, MetricService};
