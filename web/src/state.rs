//! Application state shared by all HTTP handlers.

use crate::config::Config;
use crate::notifications::HttpNotifier;
use forecast_core::{
    ForecastAction, ForecastEnvironment, ForecastReducer, ForecastState, IdGenerator, Notifier,
    RandomIdGenerator,
};
use forecast_runtime::Store;
use std::sync::Arc;
use std::time::Duration;

/// The forecast store as used by the service
pub type ForecastStore = Store<ForecastState, ForecastAction, ForecastEnvironment, ForecastReducer>;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Forecast store
    pub store: Arc<ForecastStore>,
    /// How long a report request waits for its outcome
    pub report_timeout: Duration,
}

impl AppState {
    /// Create state around an existing store
    #[must_use]
    pub const fn new(store: Arc<ForecastStore>, report_timeout: Duration) -> Self {
        Self {
            store,
            report_timeout,
        }
    }

    /// Wire a store with the given dependencies
    #[must_use]
    pub fn with_dependencies(
        ids: Arc<dyn IdGenerator>,
        notifier: Arc<dyn Notifier>,
        report_timeout: Duration,
    ) -> Self {
        let store = Store::new(
            ForecastState::new(),
            ForecastReducer::new(),
            ForecastEnvironment::new(ids, notifier),
        );
        Self::new(Arc::new(store), report_timeout)
    }

    /// Production wiring: random ids and HTTP notifications
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let notifier = HttpNotifier::new(
            &config.notifications.base_url,
            config.notification_timeout(),
        );
        Self::with_dependencies(
            Arc::new(RandomIdGenerator),
            Arc::new(notifier),
            config.report_timeout(),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("report_timeout", &self.report_timeout)
            .finish_non_exhaustive()
    }
}
