//! Tenant-scoped product endpoints

use crate::{
    error::ApiError,
    extract::SanitizedJson,
    middleware::tenant::RequiredTenant,
    models::*,
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// List the tenant's products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(("x-tenant-id" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 200, description = "Products of the request tenant", body = ProductList),
        (status = 400, description = "No tenant on the request", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    RequiredTenant(tenant_id): RequiredTenant,
) -> Json<ApiResponse<ProductList>> {
    let items = state.products.list(&tenant_id);
    Json(ApiResponse::success(ProductList {
        total: items.len() as u64,
        items,
    }))
}

/// Create a product for the tenant
#[utoipa::path(
    post,
    path = "/api/v1/products",
    params(("x-tenant-id" = String, Header, description = "Tenant identifier")),
    request_body = ProductCreate,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "No tenant or malformed body", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    RequiredTenant(tenant_id): RequiredTenant,
    SanitizedJson(input): SanitizedJson<ProductCreate>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let product = state.products.insert(&tenant_id, input);
    tracing::info!(tenant_id = %tenant_id, product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}
