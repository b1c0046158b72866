//! Super-admin gate

use crate::error::{GuardError, GuardResult};
use crate::token::Principal;

/// The privileged role claim
pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";

/// Admits only principals whose `role` claim is [`SUPER_ADMIN_ROLE`].
/// Only placed on authenticated routes, so a missing principal is a deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAuthorizer;

impl RoleAuthorizer {
    /// Admit only a principal whose role is [`SUPER_ADMIN_ROLE`]
    pub fn authorize(&self, principal: Option<&Principal>) -> GuardResult<()> {
        match principal {
            Some(p) if p.role() == SUPER_ADMIN_ROLE => Ok(()),
            Some(p) => {
                tracing::debug!(subject = %p.subject_id(), role = %p.role(), "super admin gate denied");
                Err(GuardError::ForbiddenRole)
            }
            None => Err(GuardError::ForbiddenRole),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::revocation::InMemoryRevocationCache;
    use crate::token::{SignOptions, TokenPayload, TokenService, VerifyOptions};
    use std::sync::Arc;

    fn principal(role: &str, is_super_admin: bool) -> Principal {
        let service = TokenService::new(
            TokenConfig {
                secret: "role-test".into(),
                ..TokenConfig::default()
            },
            Arc::new(InMemoryRevocationCache::new()),
        )
        .unwrap();
        let token = service
            .sign(
                &TokenPayload {
                    sub: "u".into(),
                    email: "u@x.test".into(),
                    role: role.into(),
                    tenant_id: None,
                    is_super_admin,
                },
                SignOptions::default(),
            )
            .unwrap();
        service.verify(&token, &VerifyOptions::default()).unwrap()
    }

    #[test]
    fn test_super_admin_admitted() {
        assert!(RoleAuthorizer.authorize(Some(&principal("SUPER_ADMIN", true))).is_ok());
    }

    #[test]
    fn test_other_roles_denied() {
        for role in ["ADMIN", "MERCHANT", "super_admin", ""] {
            assert!(matches!(
                RoleAuthorizer.authorize(Some(&principal(role, false))),
                Err(GuardError::ForbiddenRole)
            ));
        }
    }

    #[test]
    fn test_flag_alone_is_not_enough() {
        assert!(RoleAuthorizer.authorize(Some(&principal("MERCHANT", true))).is_err());
    }

    #[test]
    fn test_missing_principal_denied() {
        assert!(matches!(
            RoleAuthorizer.authorize(None),
            Err(GuardError::ForbiddenRole)
        ));
    }
}
