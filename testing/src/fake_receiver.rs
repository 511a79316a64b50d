//! Programmable HTTP stand-in for the notification sink.
//!
//! Every request is logged, whether or not a stub matches it. Requests
//! without a matching stub are answered `404` and logged with
//! `matched == false`.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    Router,
};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A canned response for one method and path
#[derive(Debug, Clone)]
pub struct Stub {
    method: Method,
    path: String,
    status: StatusCode,
    delay: Option<Duration>,
}

impl Stub {
    /// Answer `POST path` with `200`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Answer `method path` with `200`
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            status: StatusCode::OK,
            delay: None,
        }
    }

    /// Answer with `status` instead
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Wait `delay` before answering
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

/// One request the recipient received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCall {
    /// HTTP method
    pub method: Method,
    /// Request path, without query
    pub path: String,
    /// Raw request body
    pub body: Bytes,
    /// Whether a registered stub matched the request
    pub matched: bool,
}

impl ReceivedCall {
    /// Decode the body as JSON
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is not a `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as lossy UTF-8, for failure messages
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct Shared {
    stubs: Mutex<Vec<Stub>>,
    calls: Mutex<Vec<ReceivedCall>>,
}

impl Shared {
    fn stubs(&self) -> std::sync::MutexGuard<'_, Vec<Stub>> {
        self.stubs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<ReceivedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Running {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Drop for Running {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }
}

/// Fake notification sink listening on an ephemeral local port
///
/// Clones share the same log and listener. The listener stops on
/// [`shutdown`](Self::shutdown) or when the last clone is dropped.
#[derive(Clone)]
pub struct FakeNotificationRecipient {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    running: Arc<Mutex<Option<Running>>>,
}

impl FakeNotificationRecipient {
    /// Bind to `127.0.0.1:0` and start serving
    ///
    /// # Errors
    ///
    /// Returns the I/O error when no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        let shared = Arc::new(Shared::default());

        let app = Router::new()
            .fallback(record_call)
            .with_state(Arc::clone(&shared));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = served {
                tracing::warn!(%error, "Fake notification recipient failed");
            }
        });

        tracing::debug!(address = %local_addr, "Fake notification recipient started");

        Ok(Self {
            local_addr,
            shared,
            running: Arc::new(Mutex::new(Some(Running {
                shutdown: Some(shutdown_tx),
                task,
            }))),
        })
    }

    /// Address the recipient listens on
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL to configure the service with
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Register a stub; later registrations win over earlier ones
    pub fn given(&self, stub: Stub) {
        self.shared.stubs().push(stub);
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn received_calls(&self) -> Vec<ReceivedCall> {
        self.shared.calls().clone()
    }

    /// Forget all stubs and received calls
    pub fn reset(&self) {
        self.shared.stubs().clear();
        self.shared.calls().clear();
    }

    /// Stop listening and wait for the server task to finish
    ///
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(mut running) = running {
            if let Some(tx) = running.shutdown.take() {
                let _ = tx.send(());
            }
            // Bounded: a client holding a connection open must not hang teardown
            let _ = tokio::time::timeout(Duration::from_secs(1), &mut running.task).await;
            tracing::debug!(address = %self.local_addr, "Fake notification recipient stopped");
        }
    }
}

impl std::fmt::Debug for FakeNotificationRecipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeNotificationRecipient")
            .field("local_addr", &self.local_addr)
            .field("received_calls", &self.shared.calls().len())
            .finish_non_exhaustive()
    }
}

async fn record_call(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> StatusCode {
    let path = uri.path().to_string();
    let stub = shared
        .stubs()
        .iter()
        .rev()
        .find(|stub| stub.matches(&method, &path))
        .cloned();

    tracing::debug!(%method, %path, matched = stub.is_some(), "Fake notification recipient called");

    shared.calls().push(ReceivedCall {
        method,
        path,
        body,
        matched: stub.is_some(),
    });

    match stub {
        Some(stub) => {
            if let Some(delay) = stub.delay {
                tokio::time::sleep(delay).await;
            }
            stub.status
        },
        None => StatusCode::NOT_FOUND,
    }
}
