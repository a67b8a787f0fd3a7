//! Liveness endpoint.

use axum::{routing::get, Router};

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}
