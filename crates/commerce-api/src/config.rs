//! Server Configuration

use commerce_guard::{ConfigError, GuardConfig, TenantPlanRecord};
use serde::{Deserialize, Serialize};

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Pipeline settings
    pub guard: GuardConfig,
    /// Tenants loaded into the in-memory store at startup
    pub tenants: Vec<TenantPlanRecord>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            guard: GuardConfig::default(),
            tenants: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply `JWT_SECRET` and `BIND_ADDR` overrides
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var("JWT_SECRET").ok(),
            std::env::var("BIND_ADDR").ok(),
        );
        self
    }

    fn apply_overrides(&mut self, secret: Option<String>, bind_addr: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.guard.token.secret = secret;
        }
        if let Some(addr) = bind_addr.filter(|s| !s.is_empty()) {
            self.bind_addr = addr;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.guard.validate()
    }

    /// Valid but likely unintended settings, logged at startup
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.guard.health.memory_budget_bytes.is_none() {
            warnings.push(
                "guard.health.memory_budget_bytes is unset: overload ratio uses total system \
                 memory, so load shedding will rarely trigger",
            );
        }
        warnings
    }
}
