//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use forecast_runtime::{HealthCheck, HealthReport, HealthStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does not look at the store or the notification sink.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One component of the readiness report.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component name
    pub component: String,
    /// `healthy`, `degraded` or `unhealthy`
    pub status: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Counters and other details
    pub metadata: BTreeMap<String, String>,
}

impl From<HealthCheck> for ComponentHealth {
    fn from(check: HealthCheck) -> Self {
        Self {
            component: check.component,
            status: check.status.to_string(),
            message: check.message,
            metadata: check.metadata.into_iter().collect(),
        }
    }
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall status (worst of all checks)
    pub status: String,
    /// Individual checks
    pub checks: Vec<ComponentHealth>,
    /// When the report was produced
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Readiness check with store and notification diagnostics.
///
/// The notification component is degraded once any delivery failed; a
/// degraded service still accepts traffic.
///
/// # Status Codes
///
/// - 200 OK: Healthy or Degraded
/// - 503 Service Unavailable: Unhealthy (shutting down)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (stored, delivered, failed) = state
        .store
        .state(|s| (s.count(), s.delivered_notifications, s.failed_notifications))
        .await;

    let store = state
        .store
        .health()
        .with_metadata("forecasts", stored.to_string());

    let notifications = if failed == 0 {
        HealthCheck::healthy("notifications")
    } else {
        HealthCheck::degraded("notifications", format!("{failed} notifications failed"))
    }
    .with_metadata("delivered", delivered.to_string())
    .with_metadata("failed", failed.to_string());

    let report = HealthReport::new(vec![store, notifications]);

    let status = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ReadinessResponse {
            status: report.status.to_string(),
            checks: report.checks.into_iter().map(ComponentHealth::from).collect(),
            timestamp: report.timestamp,
        }),
    )
}
