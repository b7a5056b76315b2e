//! API-gateway route vertical, served under `/api/routes`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, AppState, RoutesApiDoc};
pub use services::{ApiRoutePayload, ApiRouteService};
