//! Session endpoints

use crate::{error::ApiError, middleware::auth::BearerToken, models::ErrorResponse, AppState};
use axum::{extract::State, http::StatusCode, Extension};
use commerce_guard::TenantContext;
use std::sync::Arc;

/// Revoke the presented bearer token for the request tenant
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing, invalid or already revoked token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<StatusCode, ApiError> {
    state.tokens.revoke(&token, ctx.tenant_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
