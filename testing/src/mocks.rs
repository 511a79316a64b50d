//! Deterministic implementations of the environment traits.

use forecast_core::{
    ForecastId, ForecastReportedEvent, IdGenerator, NotificationError, Notifier, NotifyFuture,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Hands out ids `…0001`, `…0002`, ... in order
///
/// # Example
///
/// ```
/// use forecast_testing::mocks::SequentialIdGenerator;
/// use forecast_core::IdGenerator;
///
/// let ids = SequentialIdGenerator::new();
/// assert_ne!(ids.next_id(), ids.next_id());
/// ```
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start at 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// The id the `n`th call (1-based) returns
    #[must_use]
    pub fn nth(n: u64) -> ForecastId {
        ForecastId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> ForecastId {
        Self::nth(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Records every event and acknowledges it
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ForecastReportedEvent>>,
}

impl RecordingNotifier {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<ForecastReportedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: ForecastReportedEvent) -> NotifyFuture {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Box::pin(async { Ok(()) })
    }
}

/// Fails every delivery with the same error
#[derive(Debug, Clone)]
pub struct FailingNotifier {
    error: NotificationError,
}

impl FailingNotifier {
    /// Fail with `error`
    #[must_use]
    pub const fn new(error: NotificationError) -> Self {
        Self { error }
    }
}

impl Default for FailingNotifier {
    fn default() -> Self {
        Self::new(NotificationError::Rejected(503))
    }
}

impl Notifier for FailingNotifier {
    fn notify(&self, _event: ForecastReportedEvent) -> NotifyFuture {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}
