//! Pipeline Configuration

use crate::tenant::{Plan, PlanSet, TENANT_HEADER};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest token lifetime accepted for signing (one year)
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `token.secret` is empty
    #[error("token signing secret is empty")]
    MissingSecret,

    /// Asymmetric or otherwise non-HMAC algorithm
    #[error("unsupported token algorithm {0:?}: only HMAC algorithms are accepted")]
    UnsupportedAlgorithm(Algorithm),

    /// `token.expires_in_secs` above [`MAX_TOKEN_LIFETIME_SECS`]
    #[error("token lifetime of {0}s exceeds the one-year maximum")]
    LifetimeTooLong(u64),

    /// `tenant_header` is blank
    #[error("tenant header name is empty")]
    EmptyTenantHeader,

    /// Config file could not be read
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tenant-security pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Header carrying the tenant identifier
    pub tenant_header: String,
    /// Token signing and verification
    pub token: TokenConfig,
    /// Revocation cache preallocation
    pub revocation: RevocationConfig,
    /// Health probing
    pub health: HealthConfig,
    /// Plan requirement defaults
    pub license: LicenseConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            tenant_header: TENANT_HEADER.into(),
            token: TokenConfig::default(),
            revocation: RevocationConfig::default(),
            health: HealthConfig::default(),
            license: LicenseConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenant_header.trim().is_empty() {
            return Err(ConfigError::EmptyTenantHeader);
        }
        self.token.validate()
    }
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Default signing algorithm
    pub algorithm: Algorithm,
    /// Default token lifetime
    pub expires_in_secs: u64,
    /// Issuer claim to set and require, if any
    pub issuer: Option<String>,
    /// Clock skew tolerated on expiry
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: Algorithm::HS256,
            expires_in_secs: 3600,
            issuer: None,
            leeway_secs: 0,
        }
    }
}

impl TokenConfig {
    /// Reject an empty secret, non-HMAC algorithms and out-of-range lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.expires_in_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(ConfigError::LifetimeTooLong(self.expires_in_secs));
        }
        match self.algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(()),
            other => Err(ConfigError::UnsupportedAlgorithm(other)),
        }
    }

    /// Default token lifetime
    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in_secs)
    }
}

/// Revocation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationConfig {
    /// Records to preallocate. Not a bound: records leave only when their TTL lapses.
    pub initial_capacity: usize,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
        }
    }
}

/// Health monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Upper bound on the data-store liveness probe
    pub probe_timeout_ms: u64,
    /// Memory budget for the overload ratio. Set it for load shedding to work:
    /// the total-system-memory fallback is rarely exceeded by one process.
    pub memory_budget_bytes: Option<u64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 3000,
            memory_budget_bytes: None,
        }
    }
}

impl HealthConfig {
    /// Probe timeout as a duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Plan requirement defaults applied by path substring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Path-substring requirements, consulted after handler and group entries
    pub path_defaults: Vec<PathRequirement>,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            path_defaults: vec![PathRequirement {
                segment: "analytics".into(),
                plans: PlanSet::from([Plan::Pro, Plan::Enterprise]),
            }],
        }
    }
}

/// Any request path containing `segment` requires one of `plans`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequirement {
    /// Substring matched against the request path
    pub segment: String,
    /// Plans admitted on matching paths
    pub plans: PlanSet,
}
