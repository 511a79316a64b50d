//! Server lifecycle.
//!
//! [`ForecastServer`] binds first and serves later, so callers learn the
//! actual address (port 0 picks an ephemeral one) before traffic flows.
//! [`ServerHandle`] owns a spawned server and stops it on drop.

use crate::config::Config;
use crate::router::build_router;
use crate::state::AppState;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Errors starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serving failed
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server task panicked or was cancelled
    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The server did not stop within its shutdown timeout
    #[error("server did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}

/// A bound, not yet serving, forecast service
pub struct ForecastServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    state: AppState,
    shutdown_timeout: Duration,
}

impl ForecastServer {
    /// Bind with production wiring (random ids, HTTP notifications)
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the address cannot be bound.
    pub async fn bind(config: &Config) -> Result<Self, ServerError> {
        Self::bind_with_state(config, AppState::from_config(config)).await
    }

    /// Bind serving an already wired [`AppState`]
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the address cannot be bound.
    pub async fn bind_with_state(config: &Config, state: AppState) -> Result<Self, ServerError> {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(address = %local_addr, "Forecast server bound");

        Ok(Self {
            listener,
            local_addr,
            router: build_router(state.clone()),
            state,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    /// Address the listener is bound to
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://host:port` of this server
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// State served by this server
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `signal` resolves, then drain pending notifications
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when serving fails.
    pub async fn serve_until<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(address = %self.local_addr, "Forecast server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        if let Err(error) = self.state.store.shutdown(self.shutdown_timeout).await {
            tracing::warn!(%error, "Store did not drain cleanly");
        }

        tracing::info!(address = %self.local_addr, "Forecast server stopped");
        Ok(())
    }

    /// Serve on a background task
    #[must_use]
    pub fn spawn(self) -> ServerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let local_addr = self.local_addr;
        let shutdown_timeout = self.shutdown_timeout;

        let task = tokio::spawn(self.serve_until(async {
            let _ = shutdown_rx.await;
        }));

        ServerHandle {
            local_addr,
            shutdown_timeout,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

impl std::fmt::Debug for ForecastServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastServer")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

/// Handle to a server running on a background task
///
/// Dropping the handle signals shutdown and aborts the task.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_timeout: Duration,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl ServerHandle {
    /// Address the server listens on
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://host:port` of the server
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stop the server and wait for it to finish
    ///
    /// # Errors
    ///
    /// Returns the server's own error, [`ServerError::Join`] if its task
    /// failed, or [`ServerError::ShutdownTimeout`] if it did not stop in time
    /// (the task is aborted in that case).
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        // Store drain plus a margin for connections to close
        let limit = self.shutdown_timeout + Duration::from_secs(1);
        match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                task.abort();
                Err(ServerError::ShutdownTimeout(limit))
            },
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
