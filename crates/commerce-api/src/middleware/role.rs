//! Role gate middleware

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use commerce_guard::Principal;
use std::sync::Arc;

/// Admit only super administrators. Must run after `require_auth`.
pub async fn require_super_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<Arc<Principal>>().cloned();
    state.roles.authorize(principal.as_deref())?;
    Ok(next.run(request).await)
}
