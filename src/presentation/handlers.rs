// HTTP request handlers
use crate::domain::fuel::simulate_fuel_anomaly;
use crate::domain::vehicle::Position;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{ApiError, accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationQuery {
    pub fuel_drop: Option<f64>,
}

pub fn router(state: Arc<AppState>, dev_routes: bool) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/groups", get(list_groups))
        .route("/api/groups/:group/assessments", get(group_assessments))
        .route("/api/groups/:group/assessments/stream", get(stream_group_assessments))
        .route("/api/vehicle/:code/fuelAnomaly", get(fuel_anomaly))
        .route("/api/weather", get(weather));

    if dev_routes {
        tracing::warn!("Development routes enabled");
        router = router.route("/api/dev/vehicle/:code/fuelAnomaly/simulate", get(simulate_fuel));
    }

    router.with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_groups(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let groups = state.assessment_service.list_groups().await?;
    json_response(&groups, accepts_brotli(&headers)).await
}

/// Risk report for every vehicle of a group
pub async fn group_assessments(
    Path(group): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let report = state.assessment_service.assess_group(&group).await?;
    json_response(&report, accepts_brotli(&headers)).await
}

/// Stream per-vehicle results of a group as they complete
pub async fn stream_group_assessments(
    Path(group): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.streaming_service.stream_group(&group).await;
    stream_from_receiver(rx)
}

pub async fn fuel_anomaly(
    Path(code): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ApiError::BadRequest("Invalid vehicleCode parameter".to_string()));
    }

    let verdict = state.assessment_service.fuel_anomaly(code).await?;
    json_response(&verdict, accepts_brotli(&headers)).await
}

pub async fn weather(
    Query(query): Query<WeatherQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return Err(ApiError::BadRequest("Missing lat/lng".to_string()));
    };

    let view = state.assessment_service.weather_at(Position::new(lat, lng)).await?;
    json_response(&view, accepts_brotli(&headers)).await
}

/// Synthetic verdict for UI development; registered only with dev routes enabled
pub async fn simulate_fuel(Path(code): Path<String>, Query(query): Query<SimulationQuery>) -> Result<Response, ApiError> {
    let fuel_drop = query
        .fuel_drop
        .filter(|drop| drop.is_finite())
        .ok_or_else(|| ApiError::BadRequest("Missing or invalid fuelDrop".to_string()))?;

    tracing::info!("Simulating fuel drop of {} l for vehicle {}", fuel_drop, code);
    json_response(&simulate_fuel_anomaly(fuel_drop), false).await
}
