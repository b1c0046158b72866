//! Bearer Token Service
//!
//! Signs and verifies HMAC JWTs. Verification is two-stage: a token must be
//! mathematically valid (signature, algorithm, expiry) and currently valid
//! (not present in the revocation cache for the request tenant).

use crate::config::{ConfigError, TokenConfig, MAX_TOKEN_LIFETIME_SECS};
use crate::error::{GuardError, GuardResult};
use crate::revocation::{RevocationCache, RevocationKey};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Wire claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    sub: String,
    email: String,
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(default)]
    is_super_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    iat: i64,
    exp: i64,
}

/// Signing input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Subject (user) id
    pub sub: String,
    /// Subject email
    pub email: String,
    /// Role name, e.g. `MERCHANT` or `SUPER_ADMIN`
    pub role: String,
    /// Tenant the token is issued for
    pub tenant_id: Option<String>,
    /// Informational only; authorization reads `role`
    pub is_super_admin: bool,
}

/// Authenticated identity decoded from a verified token. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    claims: Claims,
}

impl Principal {
    /// Subject (user) id
    pub fn subject_id(&self) -> &str {
        &self.claims.sub
    }

    /// Subject email
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Role claim
    pub fn role(&self) -> &str {
        &self.claims.role
    }

    /// Tenant the token was issued for, if any
    pub fn tenant_id(&self) -> Option<&str> {
        self.claims.tenant_id.as_deref()
    }

    /// `isSuperAdmin` claim as issued
    pub fn is_super_admin(&self) -> bool {
        self.claims.is_super_admin
    }

    /// Issued-at (unix seconds)
    pub fn issued_at(&self) -> i64 {
        self.claims.iat
    }

    /// Expiry (unix seconds)
    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}

/// Per-call signing overrides
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Lifetime; the configured lifetime when unset
    pub expires_in: Option<Duration>,
    /// Algorithm; the configured algorithm when unset
    pub algorithm: Option<Algorithm>,
}

/// Per-call verification overrides
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Accepted algorithms; the configured algorithm when unset
    pub algorithms: Option<Vec<Algorithm>>,
    /// Clock skew in seconds; the configured leeway when unset
    pub leeway_secs: Option<u64>,
}

/// Token signer/verifier composed with the revocation cache
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    revocations: Arc<dyn RevocationCache>,
}

impl TokenService {
    /// Create token service
    pub fn new(
        config: TokenConfig,
        revocations: Arc<dyn RevocationCache>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            revocations,
        })
    }

    /// Sign a payload
    pub fn sign(&self, payload: &TokenPayload, options: SignOptions) -> GuardResult<String> {
        let now = Utc::now().timestamp();
        let expires_in = options
            .expires_in
            .unwrap_or_else(|| self.config.expires_in())
            .as_secs();
        if expires_in > MAX_TOKEN_LIFETIME_SECS {
            return Err(GuardError::InvalidLifetime(expires_in));
        }
        let exp = i64::try_from(expires_in)
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(GuardError::InvalidLifetime(expires_in))?;
        let algorithm = options.algorithm.unwrap_or(self.config.algorithm);

        let claims = Claims {
            sub: payload.sub.clone(),
            email: payload.email.clone(),
            role: payload.role.clone(),
            tenant_id: payload.tenant_id.clone(),
            is_super_admin: payload.is_super_admin,
            iss: self.config.issuer.clone(),
            iat: now,
            exp,
        };

        encode(&Header::new(algorithm), &claims, &self.encoding_key).map_err(GuardError::Signing)
    }

    /// Verify signature, algorithm and expiry
    pub fn verify(&self, token: &str, options: &VerifyOptions) -> GuardResult<Principal> {
        let validation = self.validation(options, true);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(Principal { claims: data.claims })
    }

    /// Verify, then reject tokens revoked for `tenant_id`. An already-invalid
    /// token never reaches the cache.
    pub async fn verify_with_revocation(
        &self,
        token: &str,
        tenant_id: Option<&str>,
    ) -> GuardResult<Principal> {
        let principal = self.verify(token, &VerifyOptions::default())?;

        let key = RevocationKey::derive(token, tenant_id);
        if self.revocations.is_revoked(&key).await? {
            tracing::warn!(
                subject = %principal.subject_id(),
                tenant_id = tenant_id.unwrap_or("-"),
                "revoked token presented"
            );
            return Err(GuardError::RevokedToken);
        }

        Ok(principal)
    }

    /// Revoke a token for `tenant_id` until `verify` would reject it anyway.
    /// Tokens that no longer verify need no record.
    pub async fn revoke(&self, token: &str, tenant_id: Option<&str>) -> GuardResult<()> {
        let validation = self.validation(&VerifyOptions::default(), false);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        let remaining = revocation_ttl(claims.exp, Utc::now().timestamp(), validation.leeway);
        if remaining == 0 {
            tracing::debug!(subject = %claims.sub, "token already expired, nothing to revoke");
            return Ok(());
        }

        let key = RevocationKey::derive(token, tenant_id);
        self.revocations
            .revoke(key, Duration::from_secs(remaining))
            .await?;

        tracing::info!(
            subject = %claims.sub,
            tenant_id = tenant_id.unwrap_or("-"),
            ttl_secs = remaining,
            "token revoked"
        );
        Ok(())
    }

    fn validation(&self, options: &VerifyOptions, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(self.config.algorithm);
        if let Some(algorithms) = &options.algorithms {
            validation.algorithms = algorithms.clone();
        }
        validation.leeway = options.leeway_secs.unwrap_or(self.config.leeway_secs);
        validation.validate_exp = validate_exp;
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Seconds a revocation record must outlive `now` to cover every instant a
/// token expiring at `exp` still verifies. Verification accepts through
/// `exp + leeway` inclusive at whole-second resolution, hence the extra second.
/// Zero when the token can no longer verify.
fn revocation_ttl(exp: i64, now: i64, leeway: u64) -> u64 {
    let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
    let last_valid = exp.saturating_add(leeway);
    if last_valid < now {
        return 0;
    }
    u64::try_from(last_valid.saturating_sub(now).saturating_add(1)).unwrap_or(u64::MAX)
}
