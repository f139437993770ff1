//! Current-session endpoint.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::api::context::SecurityContext;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub roles: BTreeSet<String>,
    pub authorities: BTreeSet<String>,
}

/// Describe the request's identity, or 204 when it is anonymous.
///
/// An anonymous request gets no body at all, so the response cannot be used
/// to probe authentication state details.
pub async fn session(Extension(context): Extension<SecurityContext>) -> Response {
    let Some(auth) = context.authentication().filter(|auth| auth.is_authenticated()) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let principal = auth.principal();
    let response = SessionResponse {
        user_id: principal.user_id(),
        login_name: principal.login_name().to_string(),
        display_name: principal.display_name(),
        email: principal.email().to_string(),
        roles: principal.roles().clone(),
        authorities: auth.authorities().clone(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
