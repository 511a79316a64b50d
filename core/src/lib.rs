//! # Forecast Core
//!
//! Domain types and business logic for the weather forecast service.
//!
//! The service follows the Reducer pattern: every input is an action, the
//! reducer validates it and mutates state in place, and any I/O the outcome
//! requires (notifying the downstream sink) is returned as an [`Effect`]
//! description for the runtime to execute.
//!
//! ## Core Concepts
//!
//! - **State**: [`ForecastState`], every accepted report plus the per-owner index
//! - **Action**: [`ForecastAction`], the report command and the events fed back by effects
//! - **Reducer**: [`ForecastReducer`], `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions, never executed here
//! - **Environment**: injected dependencies ([`IdGenerator`], [`Notifier`])
//!
//! ## Example
//!
//! ```
//! use forecast_core::{
//!     ForecastAction, ForecastEnvironment, ForecastReducer, ForecastState,
//!     WeatherForecastReport, reducer::Reducer,
//! };
//! # use forecast_core::{notification::{Notifier, NotifyFuture}, ForecastReportedEvent};
//! # use forecast_core::environment::RandomIdGenerator;
//! # use std::sync::Arc;
//! # struct Quiet;
//! # impl Notifier for Quiet {
//! #     fn notify(&self, _event: ForecastReportedEvent) -> NotifyFuture {
//! #         Box::pin(async { Ok(()) })
//! #     }
//! # }
//! let env = ForecastEnvironment::new(Arc::new(RandomIdGenerator), Arc::new(Quiet));
//! let mut state = ForecastState::new();
//!
//! let report = WeatherForecastReport::new("tenant", "user", chrono::Utc::now(), 21, "Mild");
//! let effects = ForecastReducer.reduce(
//!     &mut state,
//!     ForecastAction::ReportForecast { request_id: uuid::Uuid::new_v4(), report },
//!     &env,
//! );
//!
//! assert_eq!(state.count(), 1);
//! assert_eq!(effects.len(), 1);
//! ```

pub mod forecast;
pub mod notification;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

pub use environment::{IdGenerator, RandomIdGenerator};
pub use forecast::{
    validate_report, ForecastAction, ForecastEnvironment, ForecastReducer, ForecastState,
    ValidationError, MIN_TEMPERATURE_C,
};
pub use notification::{NotificationError, Notifier, NotifyFuture};
pub use types::{
    ForecastCreationResult, ForecastId, ForecastReportedEvent, OwnerKey, WeatherForecastReport,
};

/// Reducer module - the core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values returned from reducers. The runtime executes them and
/// feeds any action they produce back into the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should
    /// happen, returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action>
    where
        Action: Send + 'static,
    {
        /// Wrap an async computation whose output is fed back into the reducer
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Feed an already known action back into the reducer
        #[must_use]
        pub fn action(action: Action) -> Self {
            Effect::Future(Box::pin(std::future::ready(Some(action))))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Self {
            Effect::Parallel(effects)
        }
    }
}

/// Environment module - dependency injection traits
///
/// Everything the reducer cannot decide on its own (fresh identifiers,
/// delivery of notifications) is abstracted behind a trait and injected via
/// the environment, so tests can swap in deterministic implementations.
pub mod environment {
    use crate::types::ForecastId;

    /// Source of forecast identifiers
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier candidate
        fn next_id(&self) -> ForecastId;
    }

    /// Production id generator backed by random (v4) UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn next_id(&self) -> ForecastId {
            ForecastId::new()
        }
    }
}
