use axum::{
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde_json::json;

// axum handler for health
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }));

    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("{}:{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).parse() {
        headers.insert("X-App", value);
    }

    (headers, body)
}
