//! Report endpoints

use crate::{models::*, AppState};
use axum::{extract::State, Extension, Json};
use commerce_guard::{LicenseDecision, TenantContext};
use std::sync::Arc;

fn admitted_plan(decision: LicenseDecision) -> Option<PlanName> {
    match decision {
        LicenseDecision::PlanSatisfied(plan) => Some(plan.into()),
        _ => None,
    }
}

/// Sales report for the current period
#[utoipa::path(
    get,
    path = "/api/v1/reports/sales",
    responses(
        (status = 200, body = SalesReport),
        (status = 403, description = "Requires PRO or ENTERPRISE", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn sales(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
    Extension(decision): Extension<LicenseDecision>,
) -> Json<ApiResponse<SalesReport>> {
    let (products_listed, catalog_value_cents) = ctx
        .tenant_id()
        .map_or((0, 0), |id| state.products.totals(id));

    Json(ApiResponse::success(SalesReport {
        tenant_id: ctx.tenant_id().map(str::to_string),
        plan: admitted_plan(decision),
        period: chrono::Utc::now().format("%Y-%m").to_string(),
        products_listed,
        catalog_value_cents,
    }))
}

/// Full catalog export
#[utoipa::path(
    get,
    path = "/api/v1/reports/export",
    responses(
        (status = 200, body = ExportReport),
        (status = 403, description = "Requires ENTERPRISE", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn export(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
    Extension(decision): Extension<LicenseDecision>,
) -> Json<ApiResponse<ExportReport>> {
    let rows = ctx
        .tenant_id()
        .map_or(0, |id| state.products.totals(id).0);

    Json(ApiResponse::success(ExportReport {
        tenant_id: ctx.tenant_id().map(str::to_string),
        plan: admitted_plan(decision),
        format: "csv".into(),
        rows,
    }))
}
