//! Plan gate middleware

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use commerce_guard::{RouteTarget, TenantContext};
use std::sync::Arc;

/// Check the tenant's plan against the matched route's requirement.
/// The decision is left in the request extensions for handlers.
pub async fn require_plan(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = request
        .extensions()
        .get::<TenantContext>()
        .cloned()
        .unwrap_or_default();
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let target = RouteTarget {
        method: &method,
        route: &route,
        path: &path,
    };
    let decision = state.license.authorize(&ctx, &target).await?;

    request.extensions_mut().insert(decision);
    Ok(next.run(request).await)
}
