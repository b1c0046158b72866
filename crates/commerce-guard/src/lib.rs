//! Commerce Tenant-Security Pipeline
//!
//! Every inbound request passes these checks before business logic runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TENANT-SECURITY PIPELINE                            │
//! │                                                                         │
//! │  request ──► ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │              │   Tenant     │──►│    Token     │──►│   License /  │     │
//! │              │   Context    │   │   Service    │   │     Role     │     │
//! │              └──────────────┘   └──────┬───────┘   └──────┬───────┘     │
//! │                                        │                  │             │
//! │                               ┌────────▼───────┐  ┌───────▼────────┐    │
//! │                               │  Revocation    │  │  Tenant Store  │    │
//! │                               │    Cache       │  │  (fail-open)   │    │
//! │                               └────────────────┘  └────────────────┘    │
//! │                                                                         │
//! │  ┌──────────────┐        ┌──────────────────────────────────────────┐   │
//! │  │ Sanitization │ ──────►│             business handler             │   │
//! │  └──────────────┘        └──────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  HealthMonitor (out of band): data-store probe | memory pressure │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod health;
pub mod license;
pub mod revocation;
pub mod role;
pub mod sanitize;
pub mod tenant;
pub mod token;

pub use config::{ConfigError, GuardConfig};
pub use error::{GuardError, GuardResult};
pub use health::{HealthMonitor, HealthSnapshot, HealthStatus, OVERLOAD_THRESHOLD};
pub use license::{LicenseAuthorizer, LicenseDecision, LicenseTable, RouteTarget};
pub use revocation::{InMemoryRevocationCache, RevocationCache, RevocationKey};
pub use role::{RoleAuthorizer, SUPER_ADMIN_ROLE};
pub use sanitize::{sanitize, sanitize_value};
pub use tenant::{
    InMemoryTenantStore, Plan, PlanSet, TenantContext, TenantContextResolver, TenantPlanRecord,
    TenantStore,
};
pub use token::{Principal, SignOptions, TokenPayload, TokenService, VerifyOptions};
