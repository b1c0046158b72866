//! Authentication middleware

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use commerce_guard::{GuardError, TenantContext};
use std::sync::Arc;

/// Raw bearer credential of an authenticated request, kept for logout
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Extract the credential from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Verify the bearer token against signature, expiry and revocation state,
/// then attach the `Principal` to the request.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or(GuardError::MissingToken)?
        .to_string();
    let tenant_id = request
        .extensions()
        .get::<TenantContext>()
        .and_then(TenantContext::tenant_id)
        .map(str::to_string);

    let principal = state
        .tokens
        .verify_with_revocation(&token, tenant_id.as_deref())
        .await?;

    if tenant_mismatch(principal.tenant_id(), tenant_id.as_deref()) {
        tracing::warn!(
            subject = %principal.subject_id(),
            token_tenant = principal.tenant_id().unwrap_or("-"),
            request_tenant = tenant_id.as_deref().unwrap_or("-"),
            "token presented for a different tenant"
        );
    }

    request.extensions_mut().insert(Arc::new(principal));
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

/// Token issued for one tenant, request scoped to another. Logged only: the
/// tenant header is not a trust decision.
fn tenant_mismatch(claimed: Option<&str>, requested: Option<&str>) -> bool {
    matches!((claimed, requested), (Some(claimed), Some(requested)) if claimed != requested)
}
