//! Router configuration for the forecast service.

use crate::handlers::{
    get_forecast, health_check, list_forecasts, readiness_check, report_forecast,
};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`, `GET /health/ready`
/// - `POST /WeatherForecast`
/// - `GET /WeatherForecast/:id`
/// - `GET /WeatherForecast/:tenant_id/:user_id`
pub fn build_router(state: AppState) -> Router {
    let forecast_routes = Router::new()
        .route("/WeatherForecast", post(report_forecast))
        .route("/WeatherForecast/:id", get(get_forecast))
        .route("/WeatherForecast/:tenant_id/:user_id", get(list_forecasts));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .merge(forecast_routes)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
