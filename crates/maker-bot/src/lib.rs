//! Market maker application library.

pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod strategy;

pub use app::Application;
pub use config::{AnalyticsSection, ApiCredentials, AppConfig};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use strategy::StrategyRunner;
