//! HTTP wiring: application state, router, and the request pipeline.

pub mod context;
pub mod handlers;
pub mod sessions;

mod cookies;

use anyhow::{ensure, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::auth::AuthenticationEngine;
use crate::roles::RoleResolver;
use crate::sso::filters::{CookieInformation, LivenessFilter, PreAuthFilter};
use crate::sso::SsoStorage;
use self::sessions::LocalSessions;

/// Everything the request pipeline and handlers share.
pub struct AppState {
    engine: AuthenticationEngine,
    storage: Arc<dyn SsoStorage>,
    resolver: Arc<dyn RoleResolver>,
    pre_auth: PreAuthFilter,
    liveness: LivenessFilter,
    cookie: CookieInformation,
    sessions: LocalSessions,
    context_path: String,
    context_root: String,
    logout_path: String,
}

impl AppState {
    /// Wire the application state.
    ///
    /// # Errors
    /// Fails when required configuration is missing or empty. That is fatal
    /// at startup, not something to recover from per request.
    pub fn new(
        engine: AuthenticationEngine,
        storage: Arc<dyn SsoStorage>,
        resolver: Arc<dyn RoleResolver>,
        cookie: CookieInformation,
        context_path: impl Into<String>,
        logout_path: impl Into<String>,
    ) -> Result<Self> {
        ensure!(!cookie.name.is_empty(), "sso cookie name cannot be empty");
        let logout_path = logout_path.into();
        ensure!(!logout_path.is_empty(), "logout path cannot be empty");

        let context_path = context_path.into();
        let context_root = if context_path.is_empty() {
            "/".to_string()
        } else {
            context_path.clone()
        };

        Ok(Self {
            pre_auth: PreAuthFilter::new(storage.clone(), resolver.clone()),
            liveness: LivenessFilter::new(storage.clone()),
            engine,
            storage,
            resolver,
            cookie,
            sessions: LocalSessions::new(),
            context_path,
            context_root,
            logout_path,
        })
    }

    pub(crate) fn engine(&self) -> &AuthenticationEngine {
        &self.engine
    }

    pub(crate) fn storage(&self) -> &dyn SsoStorage {
        self.storage.as_ref()
    }

    pub(crate) fn resolver(&self) -> &dyn RoleResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn pre_auth(&self) -> &PreAuthFilter {
        &self.pre_auth
    }

    pub(crate) fn liveness(&self) -> &LivenessFilter {
        &self.liveness
    }

    pub(crate) fn cookie(&self) -> &CookieInformation {
        &self.cookie
    }

    pub(crate) fn sessions(&self) -> &LocalSessions {
        &self.sessions
    }

    pub(crate) fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Redirect target when a session fails the liveness check.
    pub(crate) fn context_root(&self) -> &str {
        &self.context_root
    }

    pub(crate) fn logout_path(&self) -> &str {
        &self.logout_path
    }
}

/// Build the application router with the full request pipeline attached.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(handlers::login::login))
        .route("/logout", get(handlers::logout::logout).post(handlers::logout::logout))
        .route("/session", get(handlers::session::session))
        .route("/health", get(handlers::health::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state))
                .layer(middleware::from_fn(context::host_scope_layer))
                .layer(middleware::from_fn(context::pre_auth_layer))
                .layer(middleware::from_fn(context::liveness_layer)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
