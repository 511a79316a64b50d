//! # Forecast Testing
//!
//! Black-box test harness for the weather forecast service.
//!
//! This crate provides:
//! - [`AppDriver`]: starts an isolated service wired to a fake notification sink
//! - Driver extensions for the forecast API and for sent notifications
//! - [`User`]: an actor that owns its identity and what it reported
//! - Test data: the [`any`] generators and [`WeatherForecastReportBuilder`]
//! - Mock environment implementations and [`ReducerTest`] for reducer-level tests
//!
//! ## Example
//!
//! ```no_run
//! use forecast_testing::{AppDriver, WeatherForecastReportBuilder};
//!
//! async fn reported_forecast_is_announced() -> Result<(), forecast_testing::DriverError> {
//!     let mut driver = AppDriver::new();
//!     driver.start().await?;
//!
//!     let report = WeatherForecastReportBuilder::new().with_temperature_c(20).build();
//!     let id = driver.weather_forecast_api()?.report_forecast(&report).await?;
//!
//!     driver
//!         .weather_forecast_api()?
//!         .get_reported_forecast_by(id)
//!         .await?
//!         .should_be_the_same_as(&report);
//!     driver.notifications()?.assert_notification_sent(&report.reported_event());
//!
//!     driver.stop().await
//! }
//! ```

pub mod any;
pub mod api;
pub mod builder;
pub mod disposables;
pub mod driver;
pub mod error;
pub mod fake_receiver;
pub mod mocks;
pub mod notifications;
pub mod reducer_test;
pub mod responses;
pub mod user;

// Re-export commonly used items
pub use api::WeatherForecastApiDriverExtension;
pub use builder::{TemperatureSequence, WeatherForecastReportBuilder};
pub use disposables::{Disposable, Disposables, DisposeError};
pub use driver::{AppDriver, DriverOptions, DriverState, NOTIFICATIONS_PATH};
pub use error::{DriverError, DriverResult};
pub use fake_receiver::{FakeNotificationRecipient, ReceivedCall, Stub};
pub use mocks::{FailingNotifier, RecordingNotifier, SequentialIdGenerator};
pub use notifications::NotificationsDriverExtension;
pub use reducer_test::{assertions, resolve_effects, ReducerTest};
pub use responses::{ReportForecastResponse, RetrievedForecast, RetrievedForecasts};
pub use user::User;

/// Install a test-friendly tracing subscriber
///
/// Honors `RUST_LOG`, writes through the test harness so output is captured
/// per test, and is safe to call from every test.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
