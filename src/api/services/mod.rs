pub mod admin;
pub mod health;

pub use admin::AdminServices;
pub use health::{AppStartTime, HealthService, health_routes};
