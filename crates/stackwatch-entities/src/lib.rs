//! Entity models for the stackwatch tables.
//!
//! The `service_id`, `gateway_id`, and `target_service` columns are logical
//! references only; no foreign keys exist and orphaned references are
//! permitted, so no relations are declared here.

pub mod activities;
pub mod api_routes;
pub mod deployments;
pub mod metrics;
pub mod services;
pub mod test_results;
