//! Super-admin endpoints

use crate::{models::*, AppState};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Platform health and overload state
#[utoipa::path(
    get,
    path = "/api/v1/admin/system",
    responses(
        (status = 200, description = "Health snapshot and overload flag"),
        (status = 403, description = "Caller is not a super admin", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SystemStatus>> {
    Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").into(),
        health: state.health.check_health().await,
        overloaded: state.health.is_overloaded(),
    }))
}
