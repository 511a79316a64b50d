//! Response wrappers with assertion helpers.
//!
//! Bodies are read eagerly so no connection outlives the call that produced
//! the wrapper.

use crate::error::DriverResult;
use forecast_core::{ForecastCreationResult, ForecastId, WeatherForecastReport};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

async fn read(response: reqwest::Response) -> DriverResult<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

fn decode_on_success<T: DeserializeOwned>(status: StatusCode, body: &str) -> DriverResult<Option<T>> {
    if status.is_success() {
        Ok(Some(serde_json::from_str(body)?))
    } else {
        Ok(None)
    }
}

/// Outcome of `POST /WeatherForecast`
#[derive(Debug, Clone)]
pub struct ReportForecastResponse {
    status: StatusCode,
    id: Option<ForecastId>,
    body: String,
}

impl ReportForecastResponse {
    pub(crate) async fn read(response: reqwest::Response) -> DriverResult<Self> {
        let (status, body) = read(response).await?;
        Self::from_parts(status, body)
    }

    pub(crate) fn from_parts(status: StatusCode, body: String) -> DriverResult<Self> {
        let id = decode_on_success::<ForecastCreationResult>(status, &body)?.map(|r| r.id);
        Ok(Self { status, id, body })
    }

    /// HTTP status
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Assigned id, present only on success
    #[must_use]
    pub const fn id(&self) -> Option<ForecastId> {
        self.id
    }

    /// Raw body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Assert the report was accepted and return its id
    ///
    /// # Panics
    ///
    /// Panics unless the status is `200 OK` with an id in the body.
    #[track_caller]
    #[allow(clippy::panic)] // Test assertion
    pub fn should_be_successful(&self) -> ForecastId {
        assert_eq!(
            self.status,
            StatusCode::OK,
            "expected the report to be accepted, body: {}",
            self.body
        );
        match self.id {
            Some(id) => id,
            None => panic!("accepted report carried no id, body: {}", self.body),
        }
    }

    /// Assert the report was rejected as invalid
    ///
    /// # Panics
    ///
    /// Panics unless the status is `400 Bad Request` and no id was returned.
    #[track_caller]
    pub fn should_be_rejected_as_bad_request(&self) {
        assert_eq!(
            self.status,
            StatusCode::BAD_REQUEST,
            "expected the report to be rejected, body: {}",
            self.body
        );
        assert!(self.id.is_none(), "rejected report carried an id");
    }
}

/// Outcome of `GET /WeatherForecast/{id}`
#[derive(Debug, Clone)]
pub struct RetrievedForecast {
    status: StatusCode,
    forecast: Option<WeatherForecastReport>,
    body: String,
}

impl RetrievedForecast {
    pub(crate) async fn read(response: reqwest::Response) -> DriverResult<Self> {
        let (status, body) = read(response).await?;
        Self::from_parts(status, body)
    }

    pub(crate) fn from_parts(status: StatusCode, body: String) -> DriverResult<Self> {
        let forecast = decode_on_success(status, &body)?;
        Ok(Self {
            status,
            forecast,
            body,
        })
    }

    /// HTTP status
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Retrieved forecast, present only on success
    #[must_use]
    pub const fn forecast(&self) -> Option<&WeatherForecastReport> {
        self.forecast.as_ref()
    }

    /// Assert the forecast was found and equals `expected`
    ///
    /// # Panics
    ///
    /// Panics on a non-200 status or a different forecast.
    #[track_caller]
    pub fn should_be_the_same_as(&self, expected: &WeatherForecastReport) {
        assert_eq!(self.status, StatusCode::OK, "forecast not retrieved, body: {}", self.body);
        assert_eq!(self.forecast.as_ref(), Some(expected));
    }

    /// Assert no forecast exists under the requested id
    ///
    /// # Panics
    ///
    /// Panics unless the status is `404 Not Found`.
    #[track_caller]
    pub fn should_be_not_found(&self) {
        assert_eq!(self.status, StatusCode::NOT_FOUND, "body: {}", self.body);
    }
}

/// Outcome of `GET /WeatherForecast/{tenantId}/{userId}`
#[derive(Debug, Clone)]
pub struct RetrievedForecasts {
    status: StatusCode,
    forecasts: Vec<WeatherForecastReport>,
    body: String,
}

impl RetrievedForecasts {
    pub(crate) async fn read(response: reqwest::Response) -> DriverResult<Self> {
        let (status, body) = read(response).await?;
        Self::from_parts(status, body)
    }

    pub(crate) fn from_parts(status: StatusCode, body: String) -> DriverResult<Self> {
        let forecasts = decode_on_success(status, &body)?.unwrap_or_default();
        Ok(Self {
            status,
            forecasts,
            body,
        })
    }

    /// HTTP status
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Retrieved forecasts in report order
    #[must_use]
    pub fn forecasts(&self) -> &[WeatherForecastReport] {
        &self.forecasts
    }

    /// Assert the listing succeeded
    ///
    /// # Panics
    ///
    /// Panics unless the status is `200 OK`.
    #[track_caller]
    pub fn should_indicate_success(&self) {
        assert_eq!(self.status, StatusCode::OK, "listing failed, body: {}", self.body);
    }

    /// Assert the listing is exactly `expected`, in order
    ///
    /// # Panics
    ///
    /// Panics when the forecasts differ in content or order.
    #[track_caller]
    pub fn should_consist_of(&self, expected: &[WeatherForecastReport]) {
        assert_eq!(self.forecasts, expected);
    }
}
