//! Driver extension for the `/WeatherForecast` endpoints.

use crate::error::{DriverError, DriverResult};
use crate::responses::{ReportForecastResponse, RetrievedForecast, RetrievedForecasts};
use forecast_core::{ForecastId, WeatherForecastReport};
use reqwest::Url;

/// Talks to the forecast endpoints of a started driver
///
/// Holds no state of its own; callers keep whatever they reported.
#[derive(Debug, Clone, Copy)]
pub struct WeatherForecastApiDriverExtension<'a> {
    client: &'a reqwest::Client,
    base_url: &'a str,
}

impl<'a> WeatherForecastApiDriverExtension<'a> {
    pub(crate) const fn new(client: &'a reqwest::Client, base_url: &'a str) -> Self {
        Self { client, base_url }
    }

    /// `/WeatherForecast` followed by `segments`, each percent-encoded
    fn url(&self, segments: &[&str]) -> DriverResult<Url> {
        let invalid = || DriverError::InvalidBaseUrl(self.base_url.to_string());
        let mut url = Url::parse(self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push("WeatherForecast")
            .extend(segments);
        Ok(url)
    }

    /// Submit `report` without judging the outcome
    ///
    /// # Errors
    ///
    /// Returns an error only when the request itself fails; rejections are
    /// reported through the response.
    pub async fn attempt_to_report_forecast(
        &self,
        report: &WeatherForecastReport,
    ) -> DriverResult<ReportForecastResponse> {
        tracing::debug!(
            tenant_id = %report.tenant_id,
            user_id = %report.user_id,
            temperature_c = report.temperature_c,
            "Reporting forecast"
        );
        let response = self.client.post(self.url(&[])?).json(report).send().await?;
        ReportForecastResponse::read(response).await
    }

    /// Submit `report` and assert it was accepted
    ///
    /// # Errors
    ///
    /// Returns an error when the request itself fails.
    ///
    /// # Panics
    ///
    /// Panics when the service does not accept the report.
    pub async fn report_forecast(&self, report: &WeatherForecastReport) -> DriverResult<ForecastId> {
        let response = self.attempt_to_report_forecast(report).await?;
        Ok(response.should_be_successful())
    }

    /// Retrieve the forecast stored under `id`
    ///
    /// # Errors
    ///
    /// Returns an error when the request itself fails.
    pub async fn get_reported_forecast_by(&self, id: ForecastId) -> DriverResult<RetrievedForecast> {
        let id = id.to_string();
        let response = self.client.get(self.url(&[&id])?).send().await?;
        RetrievedForecast::read(response).await
    }

    /// Retrieve every forecast of `tenant_id` / `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error when the request itself fails.
    pub async fn get_reported_forecasts_from(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> DriverResult<RetrievedForecasts> {
        let response = self
            .client
            .get(self.url(&[tenant_id, user_id])?)
            .send()
            .await?;
        RetrievedForecasts::read(response).await
    }
}
