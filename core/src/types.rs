//! Domain types for weather forecasts.
//!
//! Field names serialize in camelCase (`tenantId`, `temperatureC`, ...) since
//! that is the wire format clients and the notification sink agree on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier assigned to an accepted forecast
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastId(Uuid);

impl ForecastId {
    /// Creates a new random `ForecastId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `ForecastId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ForecastId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ForecastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ForecastId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A forecast as reported by a user of a tenant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecastReport {
    /// Owning tenant
    pub tenant_id: String,
    /// Reporting user
    pub user_id: String,
    /// Time the forecast applies to
    pub time: DateTime<Utc>,
    /// Temperature in degrees Celsius
    pub temperature_c: i32,
    /// Free text summary
    pub summary: String,
}

impl WeatherForecastReport {
    /// Creates a new report
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        time: DateTime<Utc>,
        temperature_c: i32,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            time,
            temperature_c,
            summary: summary.into(),
        }
    }

    /// The `(tenantId, userId)` pair this report is listed under
    #[must_use]
    pub fn owner(&self) -> OwnerKey {
        OwnerKey::new(self.tenant_id.clone(), self.user_id.clone())
    }

    /// Projection sent to the notification sink once the report is accepted
    #[must_use]
    pub fn reported_event(&self) -> ForecastReportedEvent {
        ForecastReportedEvent {
            tenant_id: self.tenant_id.clone(),
            user_id: self.user_id.clone(),
            temperature_c: self.temperature_c,
        }
    }
}

/// Body returned to the caller of a successful report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastCreationResult {
    /// Identifier to retrieve the forecast with
    pub id: ForecastId,
}

/// Notification payload announcing an accepted report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReportedEvent {
    /// Owning tenant
    pub tenant_id: String,
    /// Reporting user
    pub user_id: String,
    /// Reported temperature in degrees Celsius
    pub temperature_c: i32,
}

/// Grouping key for listing a user's forecasts
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerKey {
    /// Owning tenant
    pub tenant_id: String,
    /// Reporting user
    pub user_id: String,
}

impl OwnerKey {
    /// Creates a new owner key
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }
}
