//! Pipeline middleware
//!
//! Stages run in this order for every request:
//!
//! 1. [`tenant::resolve_tenant`] puts a `TenantContext` in the extensions
//! 2. [`shed::shed_load`] rejects work under memory pressure
//! 3. [`auth::require_auth`] verifies the bearer token (authenticated routes)
//! 4. [`license::require_plan`] / [`role::require_super_admin`] gate the route
//!
//! Body sanitization happens in the [`crate::extract::SanitizedJson`] extractor.

pub mod auth;
pub mod license;
pub mod role;
pub mod shed;
pub mod tenant;
