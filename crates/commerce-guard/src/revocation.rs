//! Token revocation cache
//!
//! Keyed by token fingerprint and tenant. Each record lives as long as the
//! token it revokes would still verify, so the cache never outgrows live
//! tokens. There is no size bound: a record is never evicted early.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{Duration, Instant};

/// Revocation cache failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Backend could not be reached or refused the operation
    #[error("revocation cache unavailable: {0}")]
    Unavailable(String),
}

/// Cache key: (token fingerprint, tenant)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevocationKey {
    fingerprint: String,
    tenant_id: Option<String>,
}

impl RevocationKey {
    /// Derive the key for a raw token within a tenant scope
    pub fn derive(token: &str, tenant_id: Option<&str>) -> Self {
        Self {
            fingerprint: fingerprint(token),
            tenant_id: tenant_id.map(str::to_string),
        }
    }

    /// SHA-256 hex fingerprint of the token
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Tenant scope of the record
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}

impl fmt::Display for RevocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "revoked:{}:{}",
            self.tenant_id.as_deref().unwrap_or("-"),
            self.fingerprint
        )
    }
}

/// Lowercase hex SHA-256 of the raw token. The token itself is never stored.
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Shared revocation store. Get and set are independent operations; a
/// concurrent revoke and verify may race.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Whether the key is currently marked revoked
    async fn is_revoked(&self, key: &RevocationKey) -> Result<bool, CacheError>;

    /// Mark the key revoked for `ttl`
    async fn revoke(&self, key: RevocationKey, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Copy)]
struct RevocationRecord {
    revoked: bool,
    ttl: Duration,
}

struct RecordExpiry;

impl Expiry<RevocationKey, RevocationRecord> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &RevocationKey,
        value: &RevocationRecord,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &RevocationKey,
        value: &RevocationRecord,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process revocation cache with per-record TTL
pub struct InMemoryRevocationCache {
    cache: Cache<RevocationKey, RevocationRecord>,
}

impl InMemoryRevocationCache {
    /// Create an unbounded cache; records leave only when their TTL lapses
    pub fn new() -> Self {
        Self::with_initial_capacity(0)
    }

    /// Create an unbounded cache with room preallocated for `initial` records
    pub fn with_initial_capacity(initial: usize) -> Self {
        let cache = Cache::builder()
            .initial_capacity(initial)
            .expire_after(RecordExpiry)
            .build();

        Self { cache }
    }

    /// Approximate number of live records
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether no records are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRevocationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationCache for InMemoryRevocationCache {
    async fn is_revoked(&self, key: &RevocationKey) -> Result<bool, CacheError> {
        Ok(self
            .cache
            .get(key)
            .await
            .map(|record| record.revoked)
            .unwrap_or(false))
    }

    async fn revoke(&self, key: RevocationKey, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Ok(());
        }
        self.cache
            .insert(key, RevocationRecord { revoked: true, ttl })
            .await;
        Ok(())
    }
}
