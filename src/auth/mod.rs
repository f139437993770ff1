//! Credential validation and the per-attempt authentication state machine.

pub mod validators;

pub use validators::{
    CredentialValidator, MemoryCredentialValidator, PgCredentialValidator, UserEntry,
};

use secrecy::SecretString;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::principal::Principal;
use crate::roles::RoleResolver;
use crate::scope::HostScope;

/// Outcome of one authentication attempt.
///
/// An authenticated instance is terminal for its attempt; re-authentication
/// always produces a fresh value. Only authenticated instances are ever
/// persisted by the SSO stores.
#[derive(Debug, Clone)]
pub struct Authentication {
    principal: Principal,
    authorities: BTreeSet<String>,
    authenticated: bool,
}

impl Authentication {
    /// An authenticated principal with its granted authorities.
    #[must_use]
    pub fn authenticated(principal: Principal, authorities: BTreeSet<String>) -> Self {
        Self {
            principal,
            authorities,
            authenticated: true,
        }
    }

    /// An unauthenticated carrier for a principal. Stores treat storing one
    /// of these as a no-op.
    #[must_use]
    pub fn unauthenticated(principal: Principal) -> Self {
        Self {
            principal,
            authorities: BTreeSet::new(),
            authenticated: false,
        }
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Validates credentials and attaches host-scoped roles.
///
/// The engine persists nothing itself. Storing the result into SSO storage
/// is the login handler's job, and only after the attempt succeeded.
pub struct AuthenticationEngine {
    validator: Arc<dyn CredentialValidator>,
    resolver: Arc<dyn RoleResolver>,
}

impl AuthenticationEngine {
    #[must_use]
    pub fn new(validator: Arc<dyn CredentialValidator>, resolver: Arc<dyn RoleResolver>) -> Self {
        Self {
            validator,
            resolver,
        }
    }

    /// Run one login attempt for `username` under `scope`.
    ///
    /// # Errors
    /// `AuthError::BadCredentials` for unknown users and wrong passwords
    /// alike; callers get no signal which one it was.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
        scope: &HostScope,
    ) -> Result<Authentication, AuthError> {
        let Some(principal) = self.validator.validate(username, password, scope).await else {
            debug!("credential validation failed");
            return Err(AuthError::BadCredentials);
        };
        Ok(attach_roles(principal, self.resolver.as_ref(), scope))
    }
}

/// Recompute roles and authorities for `principal` under `scope`.
///
/// Shared by fresh logins and SSO pre-authentication, so a role-mapping
/// change applies on the next request without a re-login.
#[must_use]
pub fn attach_roles(
    principal: Principal,
    resolver: &dyn RoleResolver,
    scope: &HostScope,
) -> Authentication {
    let roles = resolver.roles(scope, principal.groups());
    let authorities = resolver.to_authorities(Some(&roles)).unwrap_or_default();
    Authentication::authenticated(principal.with_roles(roles), authorities)
}
