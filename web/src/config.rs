//! Configuration for the forecast service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Tests and the driver build a [`Config`] programmatically instead.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Outbound notification configuration
    pub notifications: NotificationsConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to (0 picks an ephemeral port)
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Notification sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Base URL; events are posted to `{base_url}/notifications`
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                host: lookup("FORECAST_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: parsed(&lookup, "FORECAST_PORT").unwrap_or(8080),
                shutdown_timeout: parsed(&lookup, "FORECAST_SHUTDOWN_TIMEOUT_SECS").unwrap_or(10),
            },
            notifications: NotificationsConfig {
                base_url: lookup("NOTIFICATIONS_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:9090".to_string()),
                timeout_ms: parsed(&lookup, "NOTIFICATIONS_TIMEOUT_MS").unwrap_or(2000),
            },
        }
    }

    /// Override the address to bind to
    #[must_use]
    pub fn with_bind_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.server.host = host.into();
        self.server.port = port;
        self
    }

    /// Override the notification sink base URL
    #[must_use]
    pub fn with_notifications_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.notifications.base_url = base_url.into();
        self
    }

    /// Override the per-notification timeout
    #[must_use]
    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notifications.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Override the graceful shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.server.shutdown_timeout = timeout.as_secs();
        self
    }

    /// `host:port` to bind the listener to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Per-notification timeout
    #[must_use]
    pub const fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notifications.timeout_ms)
    }

    /// How long a report request waits for its outcome
    ///
    /// Always longer than the notification timeout so a slow sink surfaces as
    /// a failed notification, never as a timed out request.
    #[must_use]
    pub fn report_timeout(&self) -> Duration {
        self.notification_timeout() + Duration::from_secs(1)
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }
}

/// Parse the value under `key`, `None` when unset or unparsable
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
