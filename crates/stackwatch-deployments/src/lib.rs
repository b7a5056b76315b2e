//! Deployment tracking vertical, served under `/api/deployments`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, AppState, DeploymentsApiDoc};
pub use services::{DeploymentPayload, DeploymentService};
