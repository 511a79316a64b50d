//! Weather forecast endpoints.
//!
//! - `POST /WeatherForecast` - report a forecast
//! - `GET /WeatherForecast/:id` - retrieve one forecast
//! - `GET /WeatherForecast/:tenant_id/:user_id` - list a user's forecasts

use crate::error::AppError;
use crate::middleware::CorrelationId;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use forecast_core::{
    ForecastAction, ForecastCreationResult, ForecastId, OwnerKey, WeatherForecastReport,
};
use uuid::Uuid;

/// Report a new forecast.
///
/// Answers once the report was rejected, or once it was stored and the
/// notification attempt finished (delivered or not).
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/WeatherForecast \
///   -H "Content-Type: application/json" \
///   -d '{"tenantId":"T1","userId":"U1","time":"2024-05-01T12:00:00Z","temperatureC":20,"summary":"Sunny"}'
/// # {"id":"5f0c..."}
/// ```
///
/// # Errors
///
/// - 400 when `temperatureC` is below the allowed minimum, or the body is
///   not a well-formed report
/// - 503 while the service is shutting down
pub async fn report_forecast(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Result<Json<WeatherForecastReport>, JsonRejection>,
) -> Result<Json<ForecastCreationResult>, AppError> {
    let Json(report) = payload?;
    let request_id = Uuid::new_v4();
    tracing::debug!(
        %request_id,
        correlation_id = %correlation_id.0,
        tenant_id = %report.tenant_id,
        user_id = %report.user_id,
        "Reporting forecast"
    );

    let outcome = state
        .store
        .send_and_wait_for(
            ForecastAction::ReportForecast { request_id, report },
            |action| action.concludes(request_id),
            state.report_timeout,
        )
        .await?;

    match outcome {
        ForecastAction::NotificationDelivered { id, .. }
        | ForecastAction::NotificationFailed { id, .. } => Ok(Json(ForecastCreationResult { id })),
        ForecastAction::ForecastRejected { error, .. } => Err(error.into()),
        ForecastAction::ReportForecast { .. } => {
            Err(AppError::internal("Report command observed as its own outcome"))
        },
    }
}

/// Retrieve a forecast by id.
///
/// Ids that are not valid UUIDs are treated like unknown ids.
///
/// # Errors
///
/// 404 when no forecast is stored under `id`.
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeatherForecastReport>, AppError> {
    let Ok(forecast_id) = id.parse::<ForecastId>() else {
        return Err(AppError::not_found("Forecast", id));
    };

    state
        .store
        .state(|s| s.get(&forecast_id).cloned())
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Forecast", forecast_id))
}

/// List every forecast of a user, in report order.
///
/// An unknown tenant or user yields an empty array.
pub async fn list_forecasts(
    State(state): State<AppState>,
    Path((tenant_id, user_id)): Path<(String, String)>,
) -> Json<Vec<WeatherForecastReport>> {
    let owner = OwnerKey::new(tenant_id, user_id);
    Json(state.store.state(|s| s.list(&owner)).await)
}
