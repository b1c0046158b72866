//! Health Monitor
//!
//! Two independent signals:
//! - a data-store liveness probe bounded by a timeout, reported as a
//!   [`HealthSnapshot`] (never an error)
//! - a synchronous memory-pressure check used for load shedding

use crate::config::HealthConfig;
use crate::tenant::StoreError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;

/// Memory ratio above which the service reports itself overloaded
pub const OVERLOAD_THRESHOLD: f64 = 0.90;

/// Data-store liveness probe
#[async_trait]
pub trait DataStoreProbe: Send + Sync {
    /// Cheap round trip to the backing store
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Point-in-time memory reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    /// Bytes in use
    pub used: u64,
    /// Bytes available in total
    pub total: u64,
}

impl MemorySample {
    /// `used / total`, or `None` when the total is unknown
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.used as f64 / self.total as f64)
    }
}

/// Source of memory readings
pub trait MemorySource: Send + Sync {
    /// Take a reading; must not block on I/O
    fn sample(&self) -> MemorySample;
}

/// Resident memory of this process over a budget (or total system memory)
pub struct ProcessMemory {
    system: Mutex<System>,
    budget_bytes: Option<u64>,
}

impl ProcessMemory {
    /// Sample against `budget_bytes`, or total system memory when unset
    pub fn new(budget_bytes: Option<u64>) -> Self {
        Self {
            system: Mutex::new(System::new()),
            budget_bytes,
        }
    }
}

impl MemorySource for ProcessMemory {
    fn sample(&self) -> MemorySample {
        let mut system = self.system.lock();

        let total = match self.budget_bytes {
            Some(budget) => budget,
            None => {
                system.refresh_memory();
                system.total_memory()
            }
        };

        let used = match sysinfo::get_current_pid() {
            Ok(pid) => {
                system.refresh_process(pid);
                system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            Err(e) => {
                tracing::debug!(error = %e, "current pid unavailable for memory sample");
                0
            }
        };

        MemorySample { used, total }
    }
}

/// Overall health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every component is up
    Healthy,
    /// At least one component is down
    Degraded,
}

/// Single component state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Responded within the probe timeout
    Up,
    /// Failed or timed out
    Down,
}

/// State of one checked component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Up or down
    pub status: ComponentStatus,
}

/// Per-component breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthComponents {
    /// Data store liveness
    pub database: ComponentHealth,
}

/// Result of one health check, recomputed per call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Overall status
    pub status: HealthStatus,
    /// Component breakdown
    pub components: HealthComponents,
}

impl HealthSnapshot {
    fn from_database(up: bool) -> Self {
        let (status, database) = if up {
            (HealthStatus::Healthy, ComponentStatus::Up)
        } else {
            (HealthStatus::Degraded, ComponentStatus::Down)
        };
        Self {
            status,
            components: HealthComponents {
                database: ComponentHealth { status: database },
            },
        }
    }

    /// Whether the overall status is healthy
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Health and overload reporting
pub struct HealthMonitor {
    probe: Arc<dyn DataStoreProbe>,
    memory: Arc<dyn MemorySource>,
    probe_timeout: Duration,
}

impl HealthMonitor {
    /// Create monitor over a probe and a memory source
    pub fn new(
        probe: Arc<dyn DataStoreProbe>,
        memory: Arc<dyn MemorySource>,
        config: &HealthConfig,
    ) -> Self {
        Self {
            probe,
            memory,
            probe_timeout: config.probe_timeout(),
        }
    }

    /// Probe the data store within the configured timeout
    pub async fn check_health(&self) -> HealthSnapshot {
        let up = match tokio::time::timeout(self.probe_timeout, self.probe.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "data store probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "data store probe timed out"
                );
                false
            }
        };
        HealthSnapshot::from_database(up)
    }

    /// True iff memory usage is strictly above [`OVERLOAD_THRESHOLD`]
    pub fn is_overloaded(&self) -> bool {
        self.memory
            .sample()
            .ratio()
            .map_or(false, |ratio| ratio > OVERLOAD_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::InMemoryTenantStore;

    struct FixedMemory(MemorySample);

    impl MemorySource for FixedMemory {
        fn sample(&self) -> MemorySample {
            self.0
        }
    }

    struct DownProbe;

    #[async_trait]
    impl DataStoreProbe for DownProbe {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("refused".into()))
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl DataStoreProbe for HangingProbe {
        async fn ping(&self) -> Result<(), StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn monitor(probe: Arc<dyn DataStoreProbe>, used: u64, total: u64) -> HealthMonitor {
        HealthMonitor::new(
            probe,
            Arc::new(FixedMemory(MemorySample { used, total })),
            &HealthConfig {
                probe_timeout_ms: 50,
                memory_budget_bytes: None,
            },
        )
    }

    #[tokio::test]
    async fn test_healthy_when_probe_succeeds() {
        let snapshot = monitor(Arc::new(InMemoryTenantStore::new()), 0, 1)
            .check_health()
            .await;
        assert!(snapshot.is_healthy());
        assert_eq!(snapshot.components.database.status, ComponentStatus::Up);
    }

    #[tokio::test]
    async fn test_degraded_on_probe_error() {
        let snapshot = monitor(Arc::new(DownProbe), 0, 1).check_health().await;
        assert_eq!(snapshot.status, HealthStatus::Degraded);
        assert_eq!(snapshot.components.database.status, ComponentStatus::Down);
    }

    #[tokio::test]
    async fn test_degraded_on_probe_timeout() {
        let start = std::time::Instant::now();
        let snapshot = monitor(Arc::new(HangingProbe), 0, 1).check_health().await;
        assert_eq!(snapshot.status, HealthStatus::Degraded);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let json = serde_json::to_value(HealthSnapshot::from_database(false)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "degraded", "components": { "database": { "status": "down" } } })
        );
    }

    #[test]
    fn test_overload_threshold_is_strict() {
        let probe: Arc<dyn DataStoreProbe> = Arc::new(InMemoryTenantStore::new());
        assert!(!monitor(probe.clone(), 90, 100).is_overloaded());
        assert!(monitor(probe.clone(), 91, 100).is_overloaded());
        assert!(!monitor(probe.clone(), 50, 100).is_overloaded());
        assert!(!monitor(probe, 10, 0).is_overloaded());
    }

    #[test]
    fn test_process_memory_sample() {
        let sample = ProcessMemory::new(Some(u64::MAX)).sample();
        assert_eq!(sample.total, u64::MAX);

        let sample = ProcessMemory::new(None).sample();
        assert!(sample.used <= sample.total || sample.total == 0);
    }
}
