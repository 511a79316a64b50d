//! Actor-style helper: one reporting user.
//!
//! A [`User`] owns its identity, its temperature sequence and what it has
//! reported so far. It borrows the driver per call, so several users can
//! share one started [`AppDriver`].

use crate::builder::{TemperatureSequence, WeatherForecastReportBuilder};
use crate::driver::AppDriver;
use crate::error::DriverResult;
use crate::responses::{ReportForecastResponse, RetrievedForecast, RetrievedForecasts};
use crate::any;
use forecast_core::{ForecastId, WeatherForecastReport};

/// A user of a tenant, reporting forecasts through the driver
#[derive(Debug)]
pub struct User {
    tenant_id: String,
    user_id: String,
    temperatures: TemperatureSequence,
    reported: Vec<(ForecastId, WeatherForecastReport)>,
    last_response: Option<ReportForecastResponse>,
}

impl User {
    /// User with random tenant and user ids
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(any::string_with_prefix("tenant"), any::string_with_prefix("user"))
    }

    /// User with explicit ids
    #[must_use]
    pub fn with_ids(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            temperatures: TemperatureSequence::new(),
            reported: Vec::new(),
            last_response: None,
        }
    }

    /// Tenant this user belongs to
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// This user's id
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn new_report(&mut self) -> WeatherForecastReportBuilder {
        WeatherForecastReportBuilder::new()
            .with_tenant_id(self.tenant_id.clone())
            .with_user_id(self.user_id.clone())
            .with_distinct_valid_temperature_c(&mut self.temperatures)
    }

    /// Report a random valid forecast and assert it was accepted
    ///
    /// # Errors
    ///
    /// Returns an error when the driver is not started or the request fails.
    ///
    /// # Panics
    ///
    /// Panics when the service rejects the report.
    pub async fn report_new_forecast(&mut self, driver: &AppDriver) -> DriverResult<ForecastId> {
        self.report_new_forecast_with(driver, |report| report).await
    }

    /// Report a forecast shaped by `customize` and assert it was accepted
    ///
    /// # Errors
    ///
    /// Returns an error when the driver is not started or the request fails.
    ///
    /// # Panics
    ///
    /// Panics when the service rejects the report.
    pub async fn report_new_forecast_with<F>(
        &mut self,
        driver: &AppDriver,
        customize: F,
    ) -> DriverResult<ForecastId>
    where
        F: FnOnce(WeatherForecastReportBuilder) -> WeatherForecastReportBuilder,
    {
        let response = self.attempt_to_report_new_forecast(driver, customize).await?;
        Ok(response.should_be_successful())
    }

    /// Report a forecast shaped by `customize`, accepted or not
    ///
    /// Accepted reports become this user's last reported forecast.
    ///
    /// # Errors
    ///
    /// Returns an error when the driver is not started or the request fails.
    pub async fn attempt_to_report_new_forecast<F>(
        &mut self,
        driver: &AppDriver,
        customize: F,
    ) -> DriverResult<&ReportForecastResponse>
    where
        F: FnOnce(WeatherForecastReportBuilder) -> WeatherForecastReportBuilder,
    {
        let report = customize(self.new_report()).build();
        let response = driver
            .weather_forecast_api()?
            .attempt_to_report_forecast(&report)
            .await?;

        if let Some(id) = response.id() {
            self.reported.push((id, report));
        }
        Ok(&*self.last_response.insert(response))
    }

    /// Retrieve the forecast this user reported last
    ///
    /// # Errors
    ///
    /// Returns an error when the driver is not started or the request fails.
    ///
    /// # Panics
    ///
    /// Panics when this user has not reported anything yet.
    #[allow(clippy::panic)] // Misused test helper
    pub async fn retrieve_last_reported_forecast(
        &self,
        driver: &AppDriver,
    ) -> DriverResult<RetrievedForecast> {
        let Some((id, _)) = self.reported.last() else {
            panic!("{} has not reported a forecast yet", self.user_id);
        };
        driver.weather_forecast_api()?.get_reported_forecast_by(*id).await
    }

    /// Retrieve every forecast filed under this user
    ///
    /// # Errors
    ///
    /// Returns an error when the driver is not started or the request fails.
    pub async fn retrieve_all_reported_forecasts(
        &self,
        driver: &AppDriver,
    ) -> DriverResult<RetrievedForecasts> {
        driver
            .weather_forecast_api()?
            .get_reported_forecasts_from(&self.tenant_id, &self.user_id)
            .await
    }

    /// The last accepted report
    #[must_use]
    pub fn last_reported_forecast(&self) -> Option<&WeatherForecastReport> {
        self.reported.last().map(|(_, report)| report)
    }

    /// Every accepted report, oldest first
    #[must_use]
    pub fn all_reported_forecasts(&self) -> Vec<WeatherForecastReport> {
        self.reported.iter().map(|(_, report)| report.clone()).collect()
    }

    /// Response to the last report attempt, accepted or not
    #[must_use]
    pub const fn last_reported_forecast_response(&self) -> Option<&ReportForecastResponse> {
        self.last_response.as_ref()
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
