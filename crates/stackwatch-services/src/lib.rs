//! Service catalog vertical, served under `/api/services`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, AppState, ServicesApiDoc};
pub use services::{MicroserviceService, ServicePayload};
