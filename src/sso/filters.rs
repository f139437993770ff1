//! Per-request SSO checks: pre-authentication lookup and liveness
//! re-validation.
//!
//! A local in-process session and the shared SSO store can diverge, for
//! example when a sibling application's logout removes the shared token
//! while this application's session is unaware. The liveness check is what
//! keeps sibling applications consistent without any push notification.

use std::sync::Arc;
use tracing::trace;

use super::SsoStorage;
use crate::auth::{attach_roles, Authentication};
use crate::error::StoreError;
use crate::roles::RoleResolver;
use crate::scope::HostScope;

/// Configuration for the SSO cookie shared across sibling applications.
#[derive(Debug, Clone)]
pub struct CookieInformation {
    pub name: String,
    /// Optional cookie domain; when set, siblings on the same domain see
    /// the cookie. The path is always `/`.
    pub domain: Option<String>,
}

impl CookieInformation {
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }
}

/// Resolves an existing SSO token into a request identity before any
/// credential-based login is attempted.
pub struct PreAuthFilter {
    storage: Arc<dyn SsoStorage>,
    resolver: Arc<dyn RoleResolver>,
}

impl PreAuthFilter {
    #[must_use]
    pub fn new(storage: Arc<dyn SsoStorage>, resolver: Arc<dyn RoleResolver>) -> Self {
        Self { storage, resolver }
    }

    /// `cookie` is the SSO cookie value, if the request carried one.
    ///
    /// A missing cookie or a token unknown to the store yields `None` and
    /// the request falls through to the normal login flow; neither is an
    /// error. Roles are recomputed against the current `scope` on every
    /// request, so role-mapping changes apply without a re-login.
    ///
    /// # Errors
    /// Store failures propagate; the caller decides whether to treat the
    /// session as absent.
    pub fn authenticate(
        &self,
        cookie: Option<&str>,
        scope: &HostScope,
    ) -> Result<Option<Authentication>, StoreError> {
        let Some(token) = cookie else {
            trace!("no sso cookie on request");
            return Ok(None);
        };
        let Some(principal) = self.storage.find(token)? else {
            trace!("sso token not in storage, falling through to login");
            return Ok(None);
        };
        trace!("pre-authenticated {}", principal.login_name());
        Ok(Some(attach_roles(principal, self.resolver.as_ref(), scope)))
    }
}

/// Outcome of the liveness re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Nothing to check, or the session is still present in the shared
    /// store. Let the request proceed unchanged.
    Proceed,
    /// The shared SSO entry is gone. The caller must clear its
    /// authentication context, invalidate the local session, and redirect
    /// the client to the application root.
    Terminated,
}

/// Re-checks on every request that a locally authenticated session still
/// has a live entry in the shared store.
pub struct LivenessFilter {
    storage: Arc<dyn SsoStorage>,
}

impl LivenessFilter {
    #[must_use]
    pub fn new(storage: Arc<dyn SsoStorage>) -> Self {
        Self { storage }
    }

    /// `current` is the identity the request already carries from a prior
    /// step in this process; anonymous requests have nothing to re-validate.
    ///
    /// # Errors
    /// Store failures propagate; the caller decides whether to treat the
    /// session as still live.
    pub fn check(
        &self,
        current: Option<&Authentication>,
        cookie: Option<&str>,
    ) -> Result<Liveness, StoreError> {
        if !current.is_some_and(Authentication::is_authenticated) {
            return Ok(Liveness::Proceed);
        }
        let Some(token) = cookie else {
            trace!("authenticated session without an sso cookie, terminating");
            return Ok(Liveness::Terminated);
        };
        if self.storage.find(token)?.is_none() {
            trace!("sso token gone from storage, terminating local session");
            return Ok(Liveness::Terminated);
        }
        Ok(Liveness::Proceed)
    }
}
