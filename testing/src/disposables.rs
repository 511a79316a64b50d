//! Teardown list for test resources.
//!
//! Resources are disposed in reverse registration order. Every entry is
//! attempted even when an earlier one fails or panics; failures are
//! collected into a single [`DisposeError`].

use crate::fake_receiver::FakeNotificationRecipient;
use futures::future::BoxFuture;
use futures::FutureExt;
use forecast_web::ServerHandle;
use std::fmt;
use std::panic::AssertUnwindSafe;
use thiserror::Error;

/// Something that must be released at the end of a test
pub trait Disposable: Send + Sync {
    /// Release the resource
    fn dispose(self: Box<Self>) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl Disposable for ServerHandle {
    fn dispose(self: Box<Self>) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(async move { (*self).shutdown().await.map_err(anyhow::Error::from) })
    }
}

impl Disposable for FakeNotificationRecipient {
    fn dispose(self: Box<Self>) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(async move {
            self.shutdown().await;
            Ok(())
        })
    }
}

/// One entry that failed to dispose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeFailure {
    /// Name the entry was registered under
    pub name: String,
    /// What went wrong
    pub error: String,
}

/// Entries that failed during [`Disposables::dispose_all`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DisposeError {
    /// Failures in disposal order
    pub failures: Vec<DisposeFailure>,
}

impl fmt::Display for DisposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} resource(s) failed to dispose", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.name, failure.error)?;
        }
        Ok(())
    }
}

/// Ordered list of resources to release
///
/// Dropping a non-empty list drops the remaining entries without awaiting
/// them; types registered here stop their background tasks on drop.
#[derive(Default)]
pub struct Disposables {
    entries: Vec<(String, Box<dyn Disposable>)>,
}

impl Disposables {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource; it is disposed before everything registered earlier
    pub fn add(&mut self, name: impl Into<String>, disposable: impl Disposable + 'static) {
        self.entries.push((name.into(), Box::new(disposable)));
    }

    /// Number of resources still registered
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispose everything, newest first
    ///
    /// # Errors
    ///
    /// Returns a [`DisposeError`] listing every entry that failed or panicked.
    /// The list is empty afterwards either way.
    pub async fn dispose_all(&mut self) -> Result<(), DisposeError> {
        let mut failures = Vec::new();

        while let Some((name, disposable)) = self.entries.pop() {
            let outcome = AssertUnwindSafe(disposable.dispose()).catch_unwind().await;
            let error = match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(%name, "Disposed");
                    continue;
                },
                Ok(Err(error)) => error.to_string(),
                Err(_) => "panicked while disposing".to_string(),
            };

            tracing::warn!(%name, %error, "Failed to dispose");
            failures.push(DisposeFailure { name, error });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DisposeError { failures })
        }
    }
}

impl fmt::Debug for Disposables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl Drop for Disposables {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(
                remaining = self.entries.len(),
                "Dropping disposables without awaiting them"
            );
        }
    }
}
