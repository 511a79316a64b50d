//! HTTP delivery of forecast notifications.

use forecast_core::{ForecastReportedEvent, NotificationError, Notifier, NotifyFuture};
use reqwest::Client;
use std::time::Duration;

/// Posts [`ForecastReportedEvent`]s to `{base_url}/notifications`
///
/// Any 2xx answer counts as an acknowledgment. Each attempt is bounded by the
/// configured timeout and never retried.
#[derive(Clone, Debug)]
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpNotifier {
    /// Create a notifier for the sink at `base_url`
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/notifications", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    /// Full URL events are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn deliver(
        client: Client,
        endpoint: String,
        timeout: Duration,
        event: ForecastReportedEvent,
    ) -> Result<(), NotificationError> {
        let response = client
            .post(&endpoint)
            .timeout(timeout)
            .json(&event)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::TimedOut(timeout)
                } else {
                    NotificationError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%endpoint, %status, "Notification acknowledged");
            Ok(())
        } else {
            Err(NotificationError::Rejected(status.as_u16()))
        }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, event: ForecastReportedEvent) -> NotifyFuture {
        Box::pin(Self::deliver(
            self.client.clone(),
            self.endpoint.clone(),
            self.timeout,
            event,
        ))
    }
}
