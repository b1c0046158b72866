//! Analytics endpoints

use crate::{models::*, AppState};
use axum::{extract::State, Extension, Json};
use commerce_guard::TenantContext;
use std::sync::Arc;

/// Catalog overview
#[utoipa::path(
    get,
    path = "/api/v1/analytics/summary",
    responses(
        (status = 200, body = AnalyticsSummary),
        (status = 403, description = "Plan does not include analytics", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
) -> Json<ApiResponse<AnalyticsSummary>> {
    let (product_count, catalog_value_cents) = ctx
        .tenant_id()
        .map_or((0, 0), |id| state.products.totals(id));

    Json(ApiResponse::success(AnalyticsSummary {
        tenant_id: ctx.tenant_id().map(str::to_string),
        product_count,
        catalog_value_cents,
        generated_at: chrono::Utc::now(),
    }))
}
