//! Tenant context, subscription plans and the tenant store

use async_trait::async_trait;
use http::HeaderMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Default transport header carrying the tenant identifier
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Per-request tenant scope. Presence of an id is not a trust decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: Option<String>,
}

impl TenantContext {
    /// Context scoped to a tenant
    pub fn scoped(tenant_id: impl Into<String>) -> Self {
        Self { tenant_id: Some(tenant_id.into()) }
    }

    /// Context with no tenant scope
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Tenant id, if the request carried one
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Whether the request is tenant-scoped
    pub fn is_scoped(&self) -> bool {
        self.tenant_id.is_some()
    }
}

/// Reads the tenant header into a [`TenantContext`]
#[derive(Debug, Clone)]
pub struct TenantContextResolver {
    header: String,
}

impl TenantContextResolver {
    /// Resolver reading the given header name
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into().to_ascii_lowercase() }
    }

    /// Header this resolver reads
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Resolve the tenant context from request headers. Never fails:
    /// missing, empty or non-UTF-8 values leave the context unset.
    pub fn resolve(&self, headers: &HeaderMap) -> TenantContext {
        headers
            .get(self.header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(TenantContext::scoped)
            .unwrap_or_default()
    }
}

impl Default for TenantContextResolver {
    fn default() -> Self {
        Self::new(TENANT_HEADER)
    }
}

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    /// Entry tier
    Free,
    /// Paid tier
    Pro,
    /// Top tier
    Enterprise,
}

impl Plan {
    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of plans accepted by a route. Membership is exact: no plan implies another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanSet(BTreeSet<Plan>);

impl PlanSet {
    /// Whether `plan` is accepted
    pub fn allows(&self, plan: Plan) -> bool {
        self.0.contains(&plan)
    }

    /// An empty set carries no requirement
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accepted plans in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.0.iter()
    }
}

impl<const N: usize> From<[Plan; N]> for PlanSet {
    fn from(plans: [Plan; N]) -> Self {
        Self(plans.into_iter().collect())
    }
}

impl FromIterator<Plan> for PlanSet {
    fn from_iter<I: IntoIterator<Item = Plan>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for PlanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Plan::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

/// Authoritative plan of a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPlanRecord {
    /// Tenant id
    pub tenant_id: String,
    /// Current plan
    pub plan: Plan,
}

/// Tenant store failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable
    #[error("tenant store unavailable: {0}")]
    Unavailable(String),

    /// Query rejected by the backend
    #[error("tenant store query failed: {0}")]
    Query(String),

    /// No answer in time
    #[error("tenant store timed out")]
    Timeout,
}

/// Tenant persistence as seen by the authorizers
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Current plan of a tenant; `Ok(None)` when the tenant does not exist
    async fn find_plan(&self, tenant_id: &str) -> Result<Option<TenantPlanRecord>, StoreError>;
}

/// In-memory tenant store (for development and tests)
pub struct InMemoryTenantStore {
    tenants: RwLock<HashMap<String, Plan>>,
}

impl InMemoryTenantStore {
    /// Create empty store
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or change a tenant's plan
    pub fn upsert(&self, tenant_id: impl Into<String>, plan: Plan) {
        self.tenants.write().insert(tenant_id.into(), plan);
    }

    /// Remove a tenant
    pub fn remove(&self, tenant_id: &str) -> Option<Plan> {
        self.tenants.write().remove(tenant_id)
    }

    /// Number of tenants
    pub fn len(&self) -> usize {
        self.tenants.read().len()
    }

    /// Whether the store has no tenants
    pub fn is_empty(&self) -> bool {
        self.tenants.read().is_empty()
    }
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn find_plan(&self, tenant_id: &str) -> Result<Option<TenantPlanRecord>, StoreError> {
        Ok(self.tenants.read().get(tenant_id).map(|plan| TenantPlanRecord {
            tenant_id: tenant_id.to_string(),
            plan: *plan,
        }))
    }
}

#[async_trait]
impl crate::health::DataStoreProbe for InMemoryTenantStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_resolve_present_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("tenant-a"));

        let ctx = TenantContextResolver::default().resolve(&headers);
        assert_eq!(ctx.tenant_id(), Some("tenant-a"));
        assert!(ctx.is_scoped());
    }

    #[test]
    fn test_resolve_missing_or_blank_header() {
        let resolver = TenantContextResolver::default();
        assert_eq!(resolver.resolve(&HeaderMap::new()), TenantContext::unscoped());

        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("   "));
        assert!(!resolver.resolve(&headers).is_scoped());
    }

    #[test]
    fn test_resolve_non_utf8_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert!(!TenantContextResolver::default().resolve(&headers).is_scoped());
    }

    #[test]
    fn test_custom_header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-org", HeaderValue::from_static(" org-7 "));

        let ctx = TenantContextResolver::new("X-Org").resolve(&headers);
        assert_eq!(ctx.tenant_id(), Some("org-7"));
    }

    #[test]
    fn test_plan_wire_format() {
        assert_eq!(serde_json::to_string(&Plan::Enterprise).unwrap(), "\"ENTERPRISE\"");
        let set: PlanSet = serde_json::from_str(r#"["PRO","FREE"]"#).unwrap();
        assert!(set.allows(Plan::Free));
        assert!(!set.allows(Plan::Enterprise));
        assert_eq!(set.to_string(), "FREE, PRO");
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryTenantStore::new();
        store.upsert("acme", Plan::Pro);

        let record = store.find_plan("acme").await.unwrap().unwrap();
        assert_eq!(record.plan, Plan::Pro);
        assert!(store.find_plan("globex").await.unwrap().is_none());

        store.upsert("acme", Plan::Enterprise);
        assert_eq!(store.find_plan("acme").await.unwrap().unwrap().plan, Plan::Enterprise);
    }

    #[test]
    fn test_in_memory_store_probe() {
        use crate::health::DataStoreProbe;

        let store = InMemoryTenantStore::new();
        assert!(tokio_test::block_on(store.ping()).is_ok());
        assert!(store.is_empty());
    }
}
