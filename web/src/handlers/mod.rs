//! HTTP request handlers.

pub mod forecast;
pub mod health;

pub use forecast::{get_forecast, list_forecasts, report_forecast};
pub use health::{health_check, readiness_check};
