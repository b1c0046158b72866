//! Health, overload and metrics endpoints

use crate::{models::OverloadStatus, ApiDoc, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use utoipa::OpenApi;

/// Data-store health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable or probe timed out")
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.health.check_health().await;
    let status = if snapshot.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(snapshot))
}

/// Memory-pressure signal used for load shedding
#[utoipa::path(
    get,
    path = "/health/overload",
    responses((status = 200, body = OverloadStatus)),
    tag = "health"
)]
pub async fn overload(State(state): State<Arc<AppState>>) -> Json<OverloadStatus> {
    Json(OverloadStatus {
        overloaded: state.health.is_overloaded(),
    })
}

/// Prometheus exposition
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}

pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
