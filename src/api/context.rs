//! Per-request context layers: host scope, SSO pre-authentication, and
//! liveness re-validation.

use axum::{
    extract::Request,
    http::{header, Extensions, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use std::sync::Arc;
use tracing::error;

use super::cookies;
use super::sessions::SESSION_COOKIE_NAME;
use super::AppState;
use crate::auth::{attach_roles, Authentication};
use crate::error::ScopeError;
use crate::scope::HostScope;
use crate::sso::filters::Liveness;

/// The identity the request currently carries, anonymous by default.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext(Option<Authentication>);

impl SecurityContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(Authentication::is_authenticated)
    }

    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.0.as_ref()
    }
}

impl From<Authentication> for SecurityContext {
    fn from(auth: Authentication) -> Self {
        Self(Some(auth))
    }
}

/// Read the request's host scope, established by [`host_scope_layer`].
///
/// # Errors
/// `ScopeError::NotEstablished` when the layer is missing from the router
/// wiring; that is a programmer error, not a request problem.
pub fn require_scope(extensions: &Extensions) -> Result<HostScope, ScopeError> {
    extensions
        .get::<HostScope>()
        .cloned()
        .ok_or(ScopeError::NotEstablished)
}

/// Host name from the `Host` header with any port stripped.
fn request_host(headers: &HeaderMap) -> String {
    let raw = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if let Some(end) = raw.find(']') {
        // bracketed IPv6 literal, with or without a port
        return raw[..end].trim_start_matches('[').to_string();
    }
    raw.split(':').next().unwrap_or("").to_string()
}

/// Establish the request's [`HostScope`] before anything downstream needs
/// it. The scope lives in the request extensions and is dropped with the
/// request, error path included.
pub async fn host_scope_layer(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request_host(request.headers());
    let scope = HostScope::new(&host, state.context_path());
    request.extensions_mut().insert(scope);
    next.run(request).await
}

/// Populate the request's [`SecurityContext`].
///
/// An identity restored from the local session wins; otherwise the SSO
/// cookie is resolved through the shared store (the pre-authentication
/// lookup). Either way roles are recomputed for the current scope.
pub async fn pre_auth_layer(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let scope = match require_scope(request.extensions()) {
        Ok(scope) => scope,
        Err(err) => {
            error!("{err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut context = SecurityContext::anonymous();

    if let Some(session_id) = cookies::read_cookie(request.headers(), SESSION_COOKIE_NAME) {
        if let Some(principal) = state.sessions().find(&session_id) {
            context =
                SecurityContext::from(attach_roles(principal, state.resolver(), &scope));
        }
    }

    if !context.is_authenticated() {
        let cookie = cookies::read_cookie(request.headers(), &state.cookie().name);
        match state.pre_auth().authenticate(cookie.as_deref(), &scope) {
            Ok(Some(auth)) => context = SecurityContext::from(auth),
            Ok(None) => {}
            Err(err) => {
                // store trouble means no pre-authenticated identity, not a
                // failed request
                error!("sso lookup failed: {err}");
            }
        }
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Enforce that an authenticated request still has a live entry in the
/// shared store. On failure the local session is invalidated and the client
/// is redirected to the application root.
pub async fn liveness_layer(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = request
        .extensions()
        .get::<SecurityContext>()
        .cloned()
        .unwrap_or_default();

    if context.is_authenticated() {
        let cookie = cookies::read_cookie(request.headers(), &state.cookie().name);
        let live = match state.liveness().check(context.authentication(), cookie.as_deref()) {
            Ok(live) => live,
            Err(err) => {
                // a transient store failure does not log the user out
                error!("sso liveness check failed: {err}");
                Liveness::Proceed
            }
        };
        if live == Liveness::Terminated {
            if let Some(session_id) =
                cookies::read_cookie(request.headers(), SESSION_COOKIE_NAME)
            {
                state.sessions().invalidate(&session_id);
            }
            request.extensions_mut().insert(SecurityContext::anonymous());
            return Redirect::to(state.context_root()).into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::{request_host, require_scope, SecurityContext};
    use crate::auth::Authentication;
    use crate::error::ScopeError;
    use crate::principal::Principal;
    use crate::scope::HostScope;
    use axum::http::{Extensions, HeaderMap, HeaderValue};
    use std::collections::BTreeSet;

    #[test]
    fn request_host_strips_the_port() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.com:8080"));
        assert_eq!(request_host(&headers), "example.com");
    }

    #[test]
    fn request_host_handles_bracketed_ipv6() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("[::1]:8080"));
        assert_eq!(request_host(&headers), "::1");
    }

    #[test]
    fn request_host_without_header_is_empty() {
        assert_eq!(request_host(&HeaderMap::new()), "");
    }

    #[test]
    fn scope_read_before_establishment_is_an_error() {
        let extensions = Extensions::new();
        assert!(matches!(
            require_scope(&extensions),
            Err(ScopeError::NotEstablished)
        ));
    }

    #[test]
    fn scope_read_after_establishment_succeeds() {
        let mut extensions = Extensions::new();
        extensions.insert(HostScope::new("fred", "/bob"));
        assert_eq!(
            require_scope(&extensions).expect("scope"),
            HostScope::new("fred", "/bob")
        );
    }

    #[test]
    fn default_context_is_anonymous() {
        let context = SecurityContext::default();
        assert!(!context.is_authenticated());
        assert!(context.authentication().is_none());
    }

    #[test]
    fn context_from_authentication_is_authenticated() {
        let auth = Authentication::authenticated(Principal::new(1, "alice"), BTreeSet::new());
        assert!(SecurityContext::from(auth).is_authenticated());
    }
}
