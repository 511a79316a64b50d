//! Black-box driver for the forecast service.
//!
//! [`AppDriver`] starts a real service on an ephemeral port, wired to a
//! fresh [`FakeNotificationRecipient`], and hands out per-feature
//! extensions that talk to it over HTTP. Every resource it acquires is
//! registered in a [`Disposables`] list the moment it exists, so a failed
//! start or an early [`stop`](AppDriver::stop) releases everything.
//!
//! ```text
//! Created ──start()──▶ Started ──stop()──▶ Stopped
//! ```

use crate::api::WeatherForecastApiDriverExtension;
use crate::disposables::Disposables;
use crate::error::{DriverError, DriverResult};
use crate::fake_receiver::{FakeNotificationRecipient, Stub};
use crate::notifications::NotificationsDriverExtension;
use forecast_web::{Config, ForecastServer};
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// Path the service posts notifications to
pub const NOTIFICATIONS_PATH: &str = "/notifications";

const READY_TIMEOUT: Duration = Duration::from_secs(5);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How the driver configures the service and the fake recipient
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Notification timeout the service is started with
    pub notification_timeout: Duration,
    /// Status the fake recipient answers notifications with
    pub notification_status: StatusCode,
    /// Delay before the fake recipient answers
    pub notification_delay: Option<Duration>,
}

impl DriverOptions {
    /// Start the service with this notification timeout
    #[must_use]
    pub const fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Have the recipient answer with `status`
    #[must_use]
    pub const fn with_notification_status(mut self, status: StatusCode) -> Self {
        self.notification_status = status;
        self
    }

    /// Have the recipient wait `delay` before answering
    #[must_use]
    pub const fn with_notification_delay(mut self, delay: Duration) -> Self {
        self.notification_delay = Some(delay);
        self
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            notification_timeout: Duration::from_secs(1),
            notification_status: StatusCode::OK,
            notification_delay: None,
        }
    }
}

/// Lifecycle state of an [`AppDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, nothing running
    Created,
    /// Service and recipient running
    Started,
    /// Torn down; terminal
    Stopped,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct Running {
    base_url: String,
    recipient: FakeNotificationRecipient,
}

/// Starts, operates and tears down an isolated forecast service
///
/// # Example
///
/// ```no_run
/// use forecast_testing::{AppDriver, WeatherForecastReportBuilder};
///
/// # async fn scenario() -> Result<(), forecast_testing::DriverError> {
/// let mut driver = AppDriver::new();
/// driver.start().await?;
///
/// let report = WeatherForecastReportBuilder::new().with_temperature_c(20).build();
/// driver.weather_forecast_api()?.report_forecast(&report).await?;
/// driver.notifications()?.should_include_notification_about(&report);
///
/// driver.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct AppDriver {
    options: DriverOptions,
    state: DriverState,
    client: reqwest::Client,
    running: Option<Running>,
    disposables: Disposables,
}

impl AppDriver {
    /// Driver with default options
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DriverOptions::default())
    }

    /// Driver with explicit options
    #[must_use]
    pub fn with_options(options: DriverOptions) -> Self {
        Self {
            options,
            state: DriverState::Created,
            client: reqwest::Client::new(),
            running: None,
            disposables: Disposables::new(),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Start the recipient and the service; returns once both accept traffic
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidState`] unless the driver was just created
    /// - any startup failure; whatever was already started is released and
    ///   the driver ends up stopped
    pub async fn start(&mut self) -> DriverResult<()> {
        self.expect_state(DriverState::Created)?;

        match self.launch().await {
            Ok(running) => {
                tracing::debug!(base_url = %running.base_url, "Driver started");
                self.running = Some(running);
                self.state = DriverState::Started;
                Ok(())
            },
            Err(error) => {
                self.state = DriverState::Stopped;
                if let Err(teardown) = self.disposables.dispose_all().await {
                    tracing::warn!(%teardown, "Cleanup after failed start was incomplete");
                }
                Err(error)
            },
        }
    }

    async fn launch(&mut self) -> DriverResult<Running> {
        let recipient = FakeNotificationRecipient::start()
            .await
            .map_err(DriverError::Receiver)?;
        self.disposables
            .add("fake notification recipient", recipient.clone());

        let mut stub = Stub::post(NOTIFICATIONS_PATH).with_status(self.options.notification_status);
        if let Some(delay) = self.options.notification_delay {
            stub = stub.with_delay(delay);
        }
        recipient.given(stub);

        let config = Config::default()
            .with_bind_address("127.0.0.1", 0)
            .with_notifications_base_url(recipient.url())
            .with_notification_timeout(self.options.notification_timeout)
            .with_shutdown_timeout(Duration::from_secs(1));

        let server = ForecastServer::bind(&config).await?;
        let base_url = server.base_url();
        self.disposables.add("forecast service", server.spawn());

        self.wait_until_ready(&base_url).await?;

        Ok(Running {
            base_url,
            recipient,
        })
    }

    async fn wait_until_ready(&self, base_url: &str) -> DriverResult<()> {
        let health = format!("{base_url}/health");
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;

        loop {
            match self.client.get(&health).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    tracing::trace!(status = %response.status(), "Service not ready yet");
                },
                Err(error) => tracing::trace!(%error, "Service not reachable yet"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DriverError::NotReady(READY_TIMEOUT));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Stop the service, then the recipient
    ///
    /// Stopping a driver that never started is allowed and releases nothing.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidState`] when already stopped
    /// - [`DriverError::Teardown`] when a resource failed to release
    pub async fn stop(&mut self) -> DriverResult<()> {
        if self.state == DriverState::Stopped {
            return Err(DriverError::InvalidState {
                expected: DriverState::Started,
                actual: DriverState::Stopped,
            });
        }

        self.state = DriverState::Stopped;
        self.running = None;
        self.disposables.dispose_all().await?;
        tracing::debug!("Driver stopped");
        Ok(())
    }

    /// Base URL of the running service
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless started.
    pub fn base_url(&self) -> DriverResult<&str> {
        Ok(&self.running()?.base_url)
    }

    /// Extension for the `/WeatherForecast` endpoints
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless started.
    pub fn weather_forecast_api(&self) -> DriverResult<WeatherForecastApiDriverExtension<'_>> {
        let running = self.running()?;
        Ok(WeatherForecastApiDriverExtension::new(
            &self.client,
            &running.base_url,
        ))
    }

    /// Extension for the notifications the service sent
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidState`] unless started.
    pub fn notifications(&self) -> DriverResult<NotificationsDriverExtension<'_>> {
        Ok(NotificationsDriverExtension::new(&self.running()?.recipient))
    }

    fn running(&self) -> DriverResult<&Running> {
        match (&self.running, self.state) {
            (Some(running), DriverState::Started) => Ok(running),
            (_, actual) => Err(DriverError::InvalidState {
                expected: DriverState::Started,
                actual,
            }),
        }
    }

    fn expect_state(&self, expected: DriverState) -> DriverResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DriverError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

impl Default for AppDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDriver")
            .field("state", &self.state)
            .field("base_url", &self.running.as_ref().map(|r| r.base_url.as_str()))
            .field("resources", &self.disposables)
            .finish_non_exhaustive()
    }
}

/// Dropping a started driver skips the graceful [`stop`](AppDriver::stop):
/// the service handle and the fake recipient it still holds abort their
/// server tasks on drop, which releases both ports.
impl Drop for AppDriver {
    fn drop(&mut self) {
        if self.state == DriverState::Started {
            tracing::debug!(
                resources = ?self.disposables,
                "Driver dropped while started; service and recipient abort on drop"
            );
        }
    }
}
