//! Reducer logic for weather forecasts.
//!
//! A report is validated, stored under a freshly allocated id and announced
//! to the notification sink. The outcome of the announcement comes back as an
//! event so the request that triggered it can be answered.

use crate::effect::Effect;
use crate::environment::IdGenerator;
use crate::notification::{NotificationError, Notifier};
use crate::reducer::Reducer;
use crate::types::{ForecastId, OwnerKey, WeatherForecastReport};
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Lowest temperature a report may carry
pub const MIN_TEMPERATURE_C: i32 = -100;

/// Bound on id re-draws before falling back to a random id
const MAX_ID_ATTEMPTS: usize = 8;

/// Reasons a report is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Temperature is below [`MIN_TEMPERATURE_C`]
    #[error("temperatureC must be at least {minimum}, got {actual}")]
    TemperatureBelowMinimum {
        /// Lowest accepted value
        minimum: i32,
        /// Value that was reported
        actual: i32,
    },
}

/// Validates a report before it is accepted
///
/// # Errors
///
/// Returns [`ValidationError::TemperatureBelowMinimum`] when
/// `temperature_c < MIN_TEMPERATURE_C`. No other field is constrained.
pub const fn validate_report(report: &WeatherForecastReport) -> Result<(), ValidationError> {
    if report.temperature_c < MIN_TEMPERATURE_C {
        return Err(ValidationError::TemperatureBelowMinimum {
            minimum: MIN_TEMPERATURE_C,
            actual: report.temperature_c,
        });
    }
    Ok(())
}

/// All accepted forecasts
#[derive(Clone, Debug, Default)]
pub struct ForecastState {
    forecasts: HashMap<ForecastId, WeatherForecastReport>,
    by_owner: HashMap<OwnerKey, Vec<ForecastId>>,
    /// Notifications acknowledged by the sink
    pub delivered_notifications: u64,
    /// Notifications that failed or timed out
    pub failed_notifications: u64,
}

impl ForecastState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored forecasts
    #[must_use]
    pub fn count(&self) -> usize {
        self.forecasts.len()
    }

    /// Checks if a forecast exists
    #[must_use]
    pub fn contains(&self, id: &ForecastId) -> bool {
        self.forecasts.contains_key(id)
    }

    /// Returns a forecast by id
    #[must_use]
    pub fn get(&self, id: &ForecastId) -> Option<&WeatherForecastReport> {
        self.forecasts.get(id)
    }

    /// Returns every forecast of an owner, in the order they were reported
    #[must_use]
    pub fn list(&self, owner: &OwnerKey) -> Vec<WeatherForecastReport> {
        self.by_owner
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.forecasts.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert(&mut self, id: ForecastId, report: WeatherForecastReport) {
        self.by_owner.entry(report.owner()).or_default().push(id);
        self.forecasts.insert(id, report);
    }
}

/// Commands and events for forecasts
///
/// Every action carries the `request_id` of the report that caused it so a
/// caller waiting on the store can pick out its own outcome.
#[derive(Clone, Debug)]
pub enum ForecastAction {
    // ========== Commands ==========
    /// Command: accept a new report
    ReportForecast {
        /// Correlates the outcome with the caller
        request_id: Uuid,
        /// The submitted report
        report: WeatherForecastReport,
    },

    // ========== Events ==========
    /// Event: report failed validation, nothing was stored
    ForecastRejected {
        /// Correlates the outcome with the caller
        request_id: Uuid,
        /// Why the report was refused
        error: ValidationError,
    },

    /// Event: report stored and the sink acknowledged the notification
    NotificationDelivered {
        /// Correlates the outcome with the caller
        request_id: Uuid,
        /// Id the report was stored under
        id: ForecastId,
    },

    /// Event: report stored but the notification was not acknowledged
    NotificationFailed {
        /// Correlates the outcome with the caller
        request_id: Uuid,
        /// Id the report was stored under
        id: ForecastId,
        /// Delivery failure
        error: NotificationError,
    },
}

impl ForecastAction {
    /// Request id carried by every variant
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        match self {
            Self::ReportForecast { request_id, .. }
            | Self::ForecastRejected { request_id, .. }
            | Self::NotificationDelivered { request_id, .. }
            | Self::NotificationFailed { request_id, .. } => *request_id,
        }
    }

    /// Whether this action is the final outcome of the report `request_id`
    #[must_use]
    pub fn concludes(&self, request_id: Uuid) -> bool {
        !matches!(self, Self::ReportForecast { .. }) && self.request_id() == request_id
    }
}

/// Environment dependencies for the forecast reducer
#[derive(Clone)]
pub struct ForecastEnvironment {
    /// Source of forecast ids
    pub ids: Arc<dyn IdGenerator>,
    /// Downstream notification sink
    pub notifier: Arc<dyn Notifier>,
}

impl ForecastEnvironment {
    /// Creates a new `ForecastEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ids, notifier }
    }
}

impl std::fmt::Debug for ForecastEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for forecasts
#[derive(Clone, Copy, Debug, Default)]
pub struct ForecastReducer;

impl ForecastReducer {
    /// Creates a new `ForecastReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws an id not yet present in state
    ///
    /// Runs under the store's write lock, so two concurrent reports can never
    /// be handed the same id.
    fn allocate_id(state: &ForecastState, ids: &dyn IdGenerator) -> ForecastId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = ids.next_id();
            if !state.contains(&candidate) {
                return candidate;
            }
            tracing::warn!(id = %candidate, "Id generator produced a duplicate id");
        }

        loop {
            let candidate = ForecastId::new();
            if !state.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn notify(
        request_id: Uuid,
        id: ForecastId,
        report: &WeatherForecastReport,
        notifier: &Arc<dyn Notifier>,
    ) -> Effect<ForecastAction> {
        let delivery = notifier.notify(report.reported_event());

        Effect::future(async move {
            match delivery.await {
                Ok(()) => {
                    tracing::debug!(%request_id, %id, "Forecast notification delivered");
                    Some(ForecastAction::NotificationDelivered { request_id, id })
                }
                Err(error) => {
                    tracing::warn!(%request_id, %id, %error, "Forecast notification failed");
                    Some(ForecastAction::NotificationFailed {
                        request_id,
                        id,
                        error,
                    })
                }
            }
        })
    }
}

impl Reducer for ForecastReducer {
    type State = ForecastState;
    type Action = ForecastAction;
    type Environment = ForecastEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            ForecastAction::ReportForecast { request_id, report } => {
                if let Err(error) = validate_report(&report) {
                    tracing::debug!(%request_id, %error, "Forecast report rejected");
                    return smallvec![Effect::action(ForecastAction::ForecastRejected {
                        request_id,
                        error,
                    })];
                }

                let id = Self::allocate_id(state, env.ids.as_ref());
                let effect = Self::notify(request_id, id, &report, &env.notifier);
                state.insert(id, report);
                tracing::debug!(%request_id, %id, "Forecast stored");

                smallvec![effect]
            }

            // ========== Events ==========
            ForecastAction::ForecastRejected { .. } => SmallVec::new(),
            ForecastAction::NotificationDelivered { .. } => {
                state.delivered_notifications += 1;
                SmallVec::new()
            }
            ForecastAction::NotificationFailed { .. } => {
                state.failed_notifications += 1;
                SmallVec::new()
            }
        }
    }
}
