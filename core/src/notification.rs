//! Outbound notification seam.
//!
//! The reducer never performs I/O; it asks the injected [`Notifier`] for a
//! future that delivers a [`ForecastReportedEvent`] and wraps it in an effect.

use crate::types::ForecastReportedEvent;
use futures::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

/// Future returned by [`Notifier::notify`]
pub type NotifyFuture = BoxFuture<'static, Result<(), NotificationError>>;

/// Why a notification was not acknowledged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The sink could not be reached
    #[error("notification sink unreachable: {0}")]
    Unreachable(String),

    /// The sink did not answer in time
    #[error("notification timed out after {0:?}")]
    TimedOut(Duration),

    /// The sink answered with a non-2xx status
    #[error("notification sink answered with status {0}")]
    Rejected(u16),
}

/// Delivers forecast events to the downstream notification sink
///
/// Implementations must bound the time they take; the report request waits
/// for the delivery attempt to finish.
pub trait Notifier: Send + Sync {
    /// Deliver a single event
    fn notify(&self, event: ForecastReportedEvent) -> NotifyFuture;
}
