//! Logout endpoint: remove the shared SSO entry, clear cookies, redirect.

use axum::{
    extract::Extension,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::api::cookies;
use crate::api::sessions::SESSION_COOKIE_NAME;
use crate::api::AppState;

/// Handle a logout.
///
/// The shared token is removed first so sibling applications notice on
/// their next liveness check; the cookies are cleared regardless of whether
/// the token was still present.
pub async fn logout(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = cookies::read_cookie(&headers, &state.cookie().name) {
        if let Err(err) = state.storage().remove(&token) {
            error!("failed to remove sso login: {err}");
        }
    }

    if let Some(session_id) = cookies::read_cookie(&headers, SESSION_COOKIE_NAME) {
        state.sessions().invalidate(&session_id);
    }

    let mut response_headers = HeaderMap::new();
    let clear = [
        (state.cookie().name.as_str(), state.cookie().domain.as_deref()),
        (SESSION_COOKIE_NAME, None),
    ];
    for (name, domain) in clear {
        match cookies::clear_cookie(name, domain) {
            Ok(value) => {
                response_headers.append(header::SET_COOKIE, value);
            }
            Err(err) => error!("failed to build clear cookie for {name}: {err}"),
        }
    }

    match state.logout_path().parse() {
        Ok(location) => {
            response_headers.insert(header::LOCATION, location);
            (StatusCode::SEE_OTHER, response_headers).into_response()
        }
        Err(err) => {
            error!("invalid logout destination: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
