//! HTTP shell of the weather forecast service.
//!
//! Follows the "Functional Core, Imperative Shell" split: axum handlers turn
//! requests into [`forecast_core::ForecastAction`]s, the
//! [`forecast_runtime::Store`] runs the reducer and its effects, and the
//! outcome is mapped back to an HTTP response.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, correlation ids
//! │  - Request parsing                      │  ← Notification delivery (reqwest)
//! │  - Response serialization               │  ← Logging, metrics
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Validation and storage (reducer)     │
//! │  - Effect descriptions (values)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. `POST /WeatherForecast` arrives with a JSON report
//! 2. The handler sends `ReportForecast` through the store
//! 3. The reducer validates, stores and describes the notification
//! 4. The notification effect runs and feeds its outcome back
//! 5. The handler answers `200 {id}` or `400`
//!
//! # Example
//!
//! ```ignore
//! use forecast_web::{Config, ForecastServer};
//!
//! let server = ForecastServer::bind(&Config::from_env()).await?;
//! server.serve_until(shutdown_signal()).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod router;
pub mod server;
pub mod state;
pub mod telemetry;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use middleware::{correlation_id_layer, CorrelationId, CORRELATION_ID_HEADER};
pub use notifications::HttpNotifier;
pub use router::build_router;
pub use server::{ForecastServer, ServerError, ServerHandle};
pub use state::{AppState, ForecastStore};
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
