//! Error types for the tenant-security pipeline

use crate::revocation::CacheError;
use crate::tenant::{Plan, PlanSet};
use http::StatusCode;
use thiserror::Error;

/// Pipeline rejection
#[derive(Error, Debug)]
pub enum GuardError {
    /// No bearer credential on a route that requires one
    #[error("missing bearer token")]
    MissingToken,

    /// Signature, algorithm, expiry or structural failure
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token could not be produced
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),

    /// Requested lifetime is beyond the accepted maximum
    #[error("token lifetime of {0}s exceeds the maximum")]
    InvalidLifetime(u64),

    /// Cryptographically valid but explicitly revoked
    #[error("Token has been revoked")]
    RevokedToken,

    /// Revocation state could not be read
    #[error("revocation check unavailable: {0}")]
    RevocationUnavailable(#[from] CacheError),

    /// Tenant plan is not in the route's plan set
    #[error("plan {plan} does not include this feature (requires one of: {required})")]
    InsufficientPlan { plan: Plan, required: PlanSet },

    /// Tenant id present but unknown to the tenant store
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    /// Principal missing or not privileged
    #[error("super admin role required")]
    ForbiddenRole,

    /// Load shedding under memory pressure
    #[error("service overloaded, retry later")]
    Overloaded,
}

impl GuardError {
    /// HTTP status class for this rejection
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken(_) | Self::RevokedToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPlan { .. } | Self::UnknownTenant(_) | Self::ForbiddenRole => {
                StatusCode::FORBIDDEN
            }
            Self::RevocationUnavailable(_) | Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::Signing(_) | Self::InvalidLifetime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken(_) => "invalid_token",
            Self::Signing(_) => "signing_failed",
            Self::InvalidLifetime(_) => "invalid_lifetime",
            Self::RevokedToken => "revoked_token",
            Self::RevocationUnavailable(_) => "revocation_unavailable",
            Self::InsufficientPlan { .. } => "insufficient_plan",
            Self::UnknownTenant(_) => "unknown_tenant",
            Self::ForbiddenRole => "forbidden_role",
            Self::Overloaded => "overloaded",
        }
    }
}

/// Result type for pipeline stages
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(GuardError::RevokedToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GuardError::ForbiddenRole.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GuardError::InsufficientPlan {
                plan: Plan::Free,
                required: PlanSet::from([Plan::Pro]),
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(GuardError::Overloaded.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_revoked_message_is_fixed() {
        assert_eq!(GuardError::RevokedToken.to_string(), "Token has been revoked");
    }

    #[test]
    fn test_insufficient_plan_message() {
        let err = GuardError::InsufficientPlan {
            plan: Plan::Free,
            required: PlanSet::from([Plan::Pro, Plan::Enterprise]),
        };
        assert_eq!(
            err.to_string(),
            "plan FREE does not include this feature (requires one of: PRO, ENTERPRISE)"
        );
    }
}
