//! Tenant resolution middleware

use crate::error::ApiError;
use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use commerce_guard::TenantContext;
use std::sync::Arc;

/// Attach the request's `TenantContext`. Never rejects.
pub async fn resolve_tenant(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = state.resolver.resolve(request.headers());
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Tenant id for handlers that only make sense inside a tenant
#[derive(Debug, Clone)]
pub struct RequiredTenant(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequiredTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .and_then(TenantContext::tenant_id)
            .map(|id| RequiredTenant(id.to_string()))
            .ok_or_else(|| ApiError::TenantRequired(state.resolver.header().to_string()))
    }
}
