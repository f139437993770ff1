//! Credential login endpoint.

use axum::{
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::cookies;
use crate::api::sessions::SESSION_COOKIE_NAME;
use crate::api::AppState;
use crate::error::AuthError;
use crate::scope::HostScope;
use crate::sso;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Resource the user originally requested; they return there after the
    /// login succeeds.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Handle a form login.
///
/// On success a fresh SSO token is minted and persisted, the SSO and local
/// session cookies are set, and the client is redirected to the originally
/// requested resource. On failure the response carries a generic message
/// only.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Extension(scope): Extension<HostScope>,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);
    let auth = match state
        .engine()
        .authenticate(&form.username, &password, &scope)
        .await
    {
        Ok(auth) => auth,
        Err(AuthError::BadCredentials) => {
            debug!("rejected login for {scope}");
            return (StatusCode::UNAUTHORIZED, "Bad credentials".to_string()).into_response();
        }
    };

    let token = sso::mint_token();
    if let Err(err) = state.storage().store(&token, &auth) {
        error!("failed to store sso login: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let session_id = state.sessions().create(auth.principal().clone());

    let mut headers = HeaderMap::new();
    match cookies::set_cookie(&state.cookie().name, state.cookie().domain.as_deref(), &token) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(err) => {
            error!("failed to build sso cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    if let Ok(value) = cookies::set_cookie(SESSION_COOKIE_NAME, None, &session_id) {
        headers.append(header::SET_COOKIE, value);
    }

    let target = sanitize_redirect(form.redirect_to.as_deref());
    match HeaderValue::from_str(target) {
        Ok(location) => {
            headers.insert(header::LOCATION, location);
        }
        Err(err) => {
            error!("invalid redirect target: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    (StatusCode::SEE_OTHER, headers).into_response()
}

/// Only same-site absolute paths are honored; anything else falls back to
/// the root so the login form cannot be used as an open redirect.
fn sanitize_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}
