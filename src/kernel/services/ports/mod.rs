//! Service ports: traits + data contracts.

pub mod api;
pub mod config;
pub mod settings;

pub use api::{ApiError, ApiFuture, ApiOp, ApiResult, DataSource, HealthStatus};
pub use config::MapConfig;
pub use settings::Settings;
