//! Load shedding

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use commerce_guard::GuardError;
use std::sync::Arc;

/// Paths that must answer even when the service is saturated
fn is_exempt(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/") || path == "/metrics"
}

/// Reject with 503 while memory usage is above the overload threshold
pub async fn shed_load(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_exempt(request.uri().path()) && state.health.is_overloaded() {
        metrics::counter!("guard_load_shed_total").increment(1);
        tracing::warn!(path = %request.uri().path(), "shedding request under memory pressure");
        return Err(GuardError::Overloaded.into());
    }
    Ok(next.run(request).await)
}
