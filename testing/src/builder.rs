//! Builder for forecast reports used by tests.

use crate::any;
use chrono::{DateTime, Utc};
use forecast_core::{ForecastReportedEvent, WeatherForecastReport, MIN_TEMPERATURE_C};

/// Hands out distinct valid temperatures
///
/// Owned by a single test (or actor), so tests never share a counter.
#[derive(Debug, Clone)]
pub struct TemperatureSequence {
    next: i32,
}

impl TemperatureSequence {
    /// Start at a random valid temperature
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(any::valid_temperature_c())
    }

    /// Start at `first`, clamped to the valid range
    #[must_use]
    pub fn starting_at(first: i32) -> Self {
        Self {
            next: first.max(MIN_TEMPERATURE_C),
        }
    }

    /// Next temperature, never returned before by this sequence
    pub fn next_temperature_c(&mut self) -> i32 {
        let current = self.next;
        self.next = current.checked_add(1).unwrap_or(MIN_TEMPERATURE_C);
        current
    }
}

impl Default for TemperatureSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a [`WeatherForecastReport`] from random defaults
///
/// The default temperature is the lowest accepted value, so an unmodified
/// report is always valid.
///
/// ```
/// use forecast_testing::WeatherForecastReportBuilder;
///
/// let report = WeatherForecastReportBuilder::new()
///     .with_tenant_id("T1")
///     .with_temperature_c(20)
///     .build();
/// assert_eq!(report.tenant_id, "T1");
/// ```
#[derive(Debug, Clone)]
pub struct WeatherForecastReportBuilder {
    tenant_id: String,
    user_id: String,
    time: DateTime<Utc>,
    temperature_c: i32,
    summary: String,
}

impl WeatherForecastReportBuilder {
    /// Random tenant, user, time and summary at the minimum temperature
    #[must_use]
    pub fn new() -> Self {
        Self {
            tenant_id: any::string_with_prefix("tenant"),
            user_id: any::string_with_prefix("user"),
            time: any::date_time(),
            temperature_c: MIN_TEMPERATURE_C,
            summary: any::string(),
        }
    }

    /// Set the tenant
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    /// Set the user
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the forecast time
    #[must_use]
    pub const fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature_c(mut self, temperature_c: i32) -> Self {
        self.temperature_c = temperature_c;
        self
    }

    /// Take the next temperature from `sequence`
    #[must_use]
    pub fn with_distinct_valid_temperature_c(mut self, sequence: &mut TemperatureSequence) -> Self {
        self.temperature_c = sequence.next_temperature_c();
        self
    }

    /// Set the summary
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Build the report
    #[must_use]
    pub fn build(&self) -> WeatherForecastReport {
        WeatherForecastReport::new(
            self.tenant_id.clone(),
            self.user_id.clone(),
            self.time,
            self.temperature_c,
            self.summary.clone(),
        )
    }

    /// Notification the service sends once this report is accepted
    #[must_use]
    pub fn expected_event(&self) -> ForecastReportedEvent {
        self.build().reported_event()
    }
}

impl Default for WeatherForecastReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
