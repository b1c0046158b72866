//! Plan-based route licensing
//!
//! Requirements are declared up front in a [`LicenseTable`] with three tiers,
//! most specific first:
//!
//! 1. handler: `"<METHOD> <route pattern>"`
//! 2. group: a route-pattern prefix covering a family of handlers
//! 3. path default: any request path containing a segment (e.g. `analytics`)
//!
//! The tenant's plan is fetched fresh on every check. If the tenant store
//! itself fails the request is admitted (fail-open) and the event is logged
//! and counted.

use crate::config::PathRequirement;
use crate::error::{GuardError, GuardResult};
use crate::tenant::{Plan, PlanSet, TenantContext, TenantStore};
use std::collections::HashMap;
use std::sync::Arc;

/// The route a request matched
#[derive(Debug, Clone, Copy)]
pub struct RouteTarget<'a> {
    /// HTTP method
    pub method: &'a str,
    /// Matched route pattern, e.g. `/api/v1/reports/:id`
    pub route: &'a str,
    /// Concrete request path
    pub path: &'a str,
}

/// Static route → plan-set table, built at startup
#[derive(Debug, Clone, Default)]
pub struct LicenseTable {
    handlers: HashMap<String, PlanSet>,
    groups: Vec<(String, PlanSet)>,
    path_defaults: Vec<PathRequirement>,
}

impl LicenseTable {
    /// Create table with only path-substring defaults
    pub fn new(path_defaults: Vec<PathRequirement>) -> Self {
        Self {
            path_defaults,
            ..Self::default()
        }
    }

    /// Requirement for one handler; overrides any group requirement
    pub fn with_handler(mut self, method: &str, route: &str, plans: PlanSet) -> Self {
        self.handlers.insert(handler_key(method, route), plans);
        self
    }

    /// Requirement for every route under `prefix`
    pub fn with_group(mut self, prefix: &str, plans: PlanSet) -> Self {
        self.groups.push((prefix.trim_end_matches('/').to_string(), plans));
        self
    }

    /// Resolve the plan set for a route, if any tier declares one
    pub fn requirement_for(&self, target: &RouteTarget<'_>) -> Option<&PlanSet> {
        if let Some(plans) = self.handlers.get(&handler_key(target.method, target.route)) {
            return Some(plans);
        }

        let group = self
            .groups
            .iter()
            .filter(|(prefix, _)| {
                target.route == prefix
                    || target
                        .route
                        .strip_prefix(prefix.as_str())
                        .map_or(false, |rest| rest.starts_with('/'))
            })
            .max_by_key(|(prefix, _)| prefix.len());
        if let Some((_, plans)) = group {
            return Some(plans);
        }

        self.path_defaults
            .iter()
            .find(|req| target.path.contains(req.segment.as_str()))
            .map(|req| &req.plans)
    }
}

fn handler_key(method: &str, route: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), route)
}

/// Why a request was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseDecision {
    /// No tenant id on the request
    NotTenantScoped,
    /// Route declares no (or an empty) plan set
    NoRequirement,
    /// Tenant plan is in the route's set
    PlanSatisfied(Plan),
    /// Tenant store failed; admitted without enforcement
    FailedOpen,
}

/// Plan gate
pub struct LicenseAuthorizer {
    table: LicenseTable,
    store: Arc<dyn TenantStore>,
}

impl LicenseAuthorizer {
    /// Create authorizer over a requirement table and the tenant store
    pub fn new(table: LicenseTable, store: Arc<dyn TenantStore>) -> Self {
        Self { table, store }
    }

    /// Requirement table in use
    pub fn table(&self) -> &LicenseTable {
        &self.table
    }

    /// Admit or deny a request against its route's plan requirement
    pub async fn authorize(
        &self,
        ctx: &TenantContext,
        target: &RouteTarget<'_>,
    ) -> GuardResult<LicenseDecision> {
        let Some(tenant_id) = ctx.tenant_id() else {
            return Ok(LicenseDecision::NotTenantScoped);
        };

        let required = match self.table.requirement_for(target) {
            Some(plans) if !plans.is_empty() => plans,
            _ => return Ok(LicenseDecision::NoRequirement),
        };

        let record = match self.store.find_plan(tenant_id).await {
            Ok(record) => record,
            Err(e) => {
                // Availability over enforcement while the tenant store is down
                tracing::warn!(
                    tenant_id = %tenant_id,
                    route = %target.route,
                    error = %e,
                    "tenant store failed during license check, admitting request"
                );
                metrics::counter!("guard_license_fail_open_total").increment(1);
                return Ok(LicenseDecision::FailedOpen);
            }
        };

        let Some(record) = record else {
            tracing::debug!(tenant_id = %tenant_id, "license check for unknown tenant");
            return Err(GuardError::UnknownTenant(tenant_id.to_string()));
        };

        if required.allows(record.plan) {
            Ok(LicenseDecision::PlanSatisfied(record.plan))
        } else {
            tracing::debug!(
                tenant_id = %tenant_id,
                plan = %record.plan,
                required = %required,
                route = %target.route,
                "plan does not cover route"
            );
            Err(GuardError::InsufficientPlan {
                plan: record.plan,
                required: required.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LicenseConfig;
    use crate::tenant::{InMemoryTenantStore, StoreError, TenantPlanRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownStore;

    #[async_trait]
    impl TenantStore for DownStore {
        async fn find_plan(&self, _tenant_id: &str) -> Result<Option<TenantPlanRecord>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TenantStore for CountingStore {
        async fn find_plan(&self, tenant_id: &str) -> Result<Option<TenantPlanRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(TenantPlanRecord {
                tenant_id: tenant_id.into(),
                plan: Plan::Free,
            }))
        }
    }

    fn table() -> LicenseTable {
        LicenseTable::new(LicenseConfig::default().path_defaults)
            .with_group("/api/v1/reports", PlanSet::from([Plan::Pro, Plan::Enterprise]))
            .with_handler("GET", "/api/v1/reports/export", PlanSet::from([Plan::Enterprise]))
            .with_handler("GET", "/api/v1/reports/public", PlanSet::default())
    }

    fn target<'a>(method: &'a str, route: &'a str) -> RouteTarget<'a> {
        RouteTarget { method, route, path: route }
    }

    fn store() -> Arc<InMemoryTenantStore> {
        let store = Arc::new(InMemoryTenantStore::new());
        store.upsert("free-co", Plan::Free);
        store.upsert("pro-co", Plan::Pro);
        store.upsert("ent-co", Plan::Enterprise);
        store
    }

    #[test]
    fn test_requirement_tiers() {
        let table = table();

        let export = table.requirement_for(&target("GET", "/api/v1/reports/export")).unwrap();
        assert_eq!(export, &PlanSet::from([Plan::Enterprise]));

        let sales = table.requirement_for(&target("GET", "/api/v1/reports/sales")).unwrap();
        assert_eq!(sales, &PlanSet::from([Plan::Pro, Plan::Enterprise]));

        // method is part of the handler key
        let post_export = table.requirement_for(&target("POST", "/api/v1/reports/export")).unwrap();
        assert_eq!(post_export, &PlanSet::from([Plan::Pro, Plan::Enterprise]));

        let analytics = table
            .requirement_for(&target("GET", "/api/v1/analytics/summary"))
            .unwrap();
        assert_eq!(analytics, &PlanSet::from([Plan::Pro, Plan::Enterprise]));

        assert!(table.requirement_for(&target("GET", "/api/v1/products")).is_none());
        // prefix must end on a segment boundary
        assert!(table.requirement_for(&target("GET", "/api/v1/reportsx")).is_none());
    }

    #[test]
    fn test_longest_group_wins() {
        let table = LicenseTable::default()
            .with_group("/api", PlanSet::from([Plan::Free]))
            .with_group("/api/v1/billing/", PlanSet::from([Plan::Enterprise]));

        assert_eq!(
            table.requirement_for(&target("GET", "/api/v1/billing/invoices")),
            Some(&PlanSet::from([Plan::Enterprise]))
        );
        assert_eq!(
            table.requirement_for(&target("GET", "/api/v1/other")),
            Some(&PlanSet::from([Plan::Free]))
        );
    }

    #[tokio::test]
    async fn test_admits_iff_plan_in_set() {
        let guard = LicenseAuthorizer::new(table(), store());
        let sales = target("GET", "/api/v1/reports/sales");
        let export = target("GET", "/api/v1/reports/export");

        assert!(matches!(
            guard.authorize(&TenantContext::scoped("free-co"), &sales).await,
            Err(GuardError::InsufficientPlan { plan: Plan::Free, .. })
        ));
        assert_eq!(
            guard.authorize(&TenantContext::scoped("pro-co"), &sales).await.unwrap(),
            LicenseDecision::PlanSatisfied(Plan::Pro)
        );
        assert!(guard.authorize(&TenantContext::scoped("pro-co"), &export).await.is_err());
        assert_eq!(
            guard.authorize(&TenantContext::scoped("ent-co"), &export).await.unwrap(),
            LicenseDecision::PlanSatisfied(Plan::Enterprise)
        );
    }

    #[tokio::test]
    async fn test_no_implicit_hierarchy() {
        let table = LicenseTable::default().with_handler("GET", "/pro-only", PlanSet::from([Plan::Pro]));
        let guard = LicenseAuthorizer::new(table, store());

        assert!(matches!(
            guard
                .authorize(&TenantContext::scoped("ent-co"), &target("GET", "/pro-only"))
                .await,
            Err(GuardError::InsufficientPlan { plan: Plan::Enterprise, .. })
        ));
    }

    #[tokio::test]
    async fn test_unscoped_and_unrequired_skip_store() {
        let store = Arc::new(CountingStore::default());
        let guard = LicenseAuthorizer::new(table(), store.clone());

        assert_eq!(
            guard
                .authorize(&TenantContext::unscoped(), &target("GET", "/api/v1/reports/export"))
                .await
                .unwrap(),
            LicenseDecision::NotTenantScoped
        );
        assert_eq!(
            guard
                .authorize(&TenantContext::scoped("any"), &target("GET", "/api/v1/products"))
                .await
                .unwrap(),
            LicenseDecision::NoRequirement
        );
        // explicit empty set overrides the group and admits
        assert_eq!(
            guard
                .authorize(&TenantContext::scoped("any"), &target("GET", "/api/v1/reports/public"))
                .await
                .unwrap(),
            LicenseDecision::NoRequirement
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_tenant_denied() {
        let guard = LicenseAuthorizer::new(table(), store());
        assert!(matches!(
            guard
                .authorize(&TenantContext::scoped("ghost"), &target("GET", "/api/v1/reports/sales"))
                .await,
            Err(GuardError::UnknownTenant(id)) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let guard = LicenseAuthorizer::new(table(), Arc::new(DownStore));
        assert_eq!(
            guard
                .authorize(&TenantContext::scoped("pro-co"), &target("GET", "/api/v1/reports/export"))
                .await
                .unwrap(),
            LicenseDecision::FailedOpen
        );
    }
}
