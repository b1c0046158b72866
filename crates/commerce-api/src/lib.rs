//! Commerce Platform API
//!
//! HTTP surface of the tenant-security pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          COMMERCE API                                   │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │  Cors | Trace | resolve_tenant | shed_load          (all routes)   │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────────┐  ┌──────────────────┐   │
//! │  │   public     │  │  require_auth             │  │  require_auth    │   │
//! │  │ /health      │  │  require_plan             │  │  require_super_  │   │
//! │  │ /metrics     │  │ /products /analytics      │  │  admin           │   │
//! │  │ /api-docs    │  │ /reports  /auth/logout    │  │ /admin/system    │   │
//! │  └──────────────┘  └──────────────────────────┘  └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use commerce_guard::{
    config::LicenseConfig,
    health::{DataStoreProbe, MemorySource, ProcessMemory},
    ConfigError, GuardConfig, HealthMonitor, InMemoryRevocationCache, InMemoryTenantStore,
    LicenseAuthorizer, LicenseTable, Plan, PlanSet, RevocationCache, RoleAuthorizer,
    TenantContextResolver, TenantStore, TokenService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use store::ProductStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub use error::ApiError;
pub use models::*;

/// External systems the pipeline talks to
#[derive(Clone)]
pub struct Collaborators {
    pub tenants: Arc<dyn TenantStore>,
    pub probe: Arc<dyn DataStoreProbe>,
    pub revocations: Arc<dyn RevocationCache>,
    pub memory: Arc<dyn MemorySource>,
}

impl Collaborators {
    /// In-process collaborators backed by one tenant store
    pub fn in_memory(config: &GuardConfig, tenants: Arc<InMemoryTenantStore>) -> Self {
        Self {
            tenants: tenants.clone(),
            probe: tenants,
            revocations: Arc::new(InMemoryRevocationCache::with_initial_capacity(
                config.revocation.initial_capacity,
            )),
            memory: Arc::new(ProcessMemory::new(config.health.memory_budget_bytes)),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub resolver: TenantContextResolver,
    pub tokens: TokenService,
    pub license: LicenseAuthorizer,
    pub roles: RoleAuthorizer,
    pub health: HealthMonitor,
    pub products: ProductStore,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: &GuardConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            resolver: TenantContextResolver::new(config.tenant_header.clone()),
            tokens: TokenService::new(config.token.clone(), collaborators.revocations)?,
            license: LicenseAuthorizer::new(license_table(&config.license), collaborators.tenants),
            roles: RoleAuthorizer,
            health: HealthMonitor::new(collaborators.probe, collaborators.memory, &config.health),
            products: ProductStore::new(),
            metrics: None,
        })
    }

    /// Serve `/metrics` from an installed Prometheus recorder
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Plan requirements for the routes served here
pub fn license_table(config: &LicenseConfig) -> LicenseTable {
    LicenseTable::new(config.path_defaults.clone())
        .with_group("/api/v1/reports", PlanSet::from([Plan::Pro, Plan::Enterprise]))
        .with_handler("GET", "/api/v1/reports/export", PlanSet::from([Plan::Enterprise]))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Commerce API",
        version = "1.0.0",
        description = "Multi-tenant commerce platform API",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::health::overload,
        routes::auth::logout,
        routes::products::list_products,
        routes::products::create_product,
        routes::analytics::summary,
        routes::reports::sales,
        routes::reports::export,
        routes::admin::system_status,
    ),
    components(
        schemas(
            ErrorResponse,
            Product, ProductCreate, ProductList,
            AnalyticsSummary, SalesReport, ExportReport, PlanName,
            OverloadStatus
        )
    ),
    tags(
        (name = "health", description = "Health and overload signals"),
        (name = "auth", description = "Session management"),
        (name = "products", description = "Tenant catalog"),
        (name = "analytics", description = "Analytics (PRO, ENTERPRISE)"),
        (name = "reports", description = "Reporting (PRO, ENTERPRISE; export ENTERPRISE)"),
        (name = "admin", description = "Platform administration (super admin)")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/overload", get(routes::health::overload))
        .route("/metrics", get(routes::health::prometheus_metrics))
        .route("/api-docs/openapi.json", get(routes::health::openapi));

    Router::new()
        .merge(public)
        .merge(tenant_routes(&state))
        .merge(admin_routes(&state))
        .layer(from_fn_with_state(state.clone(), middleware::shed::shed_load))
        .layer(from_fn_with_state(state.clone(), middleware::tenant::resolve_tenant))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn tenant_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route(
            "/api/v1/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route("/api/v1/analytics/summary", get(routes::analytics::summary))
        .route("/api/v1/reports/sales", get(routes::reports::sales))
        .route("/api/v1/reports/export", get(routes::reports::export))
        // route_layer: last added runs first
        .route_layer(from_fn_with_state(state.clone(), middleware::license::require_plan))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_auth))
}

fn admin_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/admin/system", get(routes::admin::system_status))
        .route_layer(from_fn_with_state(state.clone(), middleware::role::require_super_admin))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_auth))
}
