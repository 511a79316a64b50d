//! Driver error types.

use crate::disposables::DisposeError;
use crate::driver::DriverState;
use forecast_web::ServerError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by [`AppDriver`](crate::AppDriver) and its extensions
///
/// Assertion failures are panics, not errors; these cover the harness
/// itself misbehaving.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Operation called in the wrong lifecycle state
    #[error("driver is {actual}, expected {expected}")]
    InvalidState {
        /// State the operation requires
        expected: DriverState,
        /// State the driver is in
        actual: DriverState,
    },

    /// The fake notification recipient could not start
    #[error("fake notification recipient failed: {0}")]
    Receiver(#[source] std::io::Error),

    /// The service could not be started
    #[error("service failed: {0}")]
    Server(#[from] ServerError),

    /// The service did not become ready in time
    #[error("service not ready after {0:?}")]
    NotReady(Duration),

    /// The service URL cannot carry path segments
    #[error("invalid service URL: {0}")]
    InvalidBaseUrl(String),

    /// An HTTP call to the service failed below the status level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body did not decode
    #[error("unexpected response body: {0}")]
    Body(#[from] serde_json::Error),

    /// Teardown left resources behind
    #[error("teardown failed: {0}")]
    Teardown(#[from] DisposeError),
}

/// Result alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;
