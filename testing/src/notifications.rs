//! Driver extension for notifications the service sent.

use crate::driver::NOTIFICATIONS_PATH;
use crate::fake_receiver::{FakeNotificationRecipient, ReceivedCall};
use axum::http::Method;
use forecast_core::{ForecastReportedEvent, WeatherForecastReport};

/// Inspects the calls the fake recipient received
#[derive(Debug, Clone, Copy)]
pub struct NotificationsDriverExtension<'a> {
    recipient: &'a FakeNotificationRecipient,
}

impl<'a> NotificationsDriverExtension<'a> {
    pub(crate) const fn new(recipient: &'a FakeNotificationRecipient) -> Self {
        Self { recipient }
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn received_calls(&self) -> Vec<ReceivedCall> {
        self.recipient.received_calls()
    }

    /// Base URL of the fake recipient the service notifies
    #[must_use]
    pub fn recipient_url(&self) -> String {
        self.recipient.url()
    }

    /// Assert exactly one notification was sent, announcing `expected`
    ///
    /// # Panics
    ///
    /// Panics when there is not exactly one call, or the call is not a
    /// matched `POST /notifications` carrying `expected`.
    #[track_caller]
    pub fn assert_notification_sent(&self, expected: &ForecastReportedEvent) {
        let calls = self.received_calls();
        assert_eq!(
            calls.len(),
            1,
            "expected exactly one notification, got {}: {calls:?}",
            calls.len()
        );
        assert_well_formed(&calls[0]);
        assert_eq!(decode(&calls[0]).as_ref(), Some(expected));
    }

    /// Assert exactly one of the notifications sent so far announces `report`
    ///
    /// Other notifications may be present; a forecast announced twice fails.
    ///
    /// # Panics
    ///
    /// Panics when zero or several calls carry the report's event, or when
    /// the carrying call is not a matched `POST /notifications`.
    #[track_caller]
    pub fn should_include_notification_about(&self, report: &WeatherForecastReport) {
        let expected = report.reported_event();
        let calls = self.received_calls();
        let about: Vec<&ReceivedCall> = calls
            .iter()
            .filter(|call| decode(call).as_ref() == Some(&expected))
            .collect();

        assert_eq!(
            about.len(),
            1,
            "expected one notification about {expected:?}, found {} among {}",
            about.len(),
            calls.len()
        );
        assert_well_formed(about[0]);
    }

    /// Assert no notification was sent at all
    ///
    /// # Panics
    ///
    /// Panics when the recipient received any call.
    #[track_caller]
    pub fn should_not_include_anything(&self) {
        let calls = self.received_calls();
        assert!(calls.is_empty(), "expected no notifications, got {calls:?}");
    }
}

fn decode(call: &ReceivedCall) -> Option<ForecastReportedEvent> {
    call.json().ok()
}

#[track_caller]
fn assert_well_formed(call: &ReceivedCall) {
    assert_eq!(call.method, Method::POST, "notification used the wrong method");
    assert_eq!(call.path, NOTIFICATIONS_PATH, "notification hit the wrong path");
    assert!(call.matched, "notification did not match a registered stub");
}
