//! Activity log vertical, served under `/api/activities`

pub mod handlers;
pub mod services;

pub use handlers::{configure_routes, ActivitiesApiDoc, AppState};
pub use services::{ActivityPayload, ActivityService};
