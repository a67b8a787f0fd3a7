//! HTTP adapters - the server's axum surface.
//!
//! - `health` - Liveness probe
//! - `internal` - Publish ingress and registry stats for the board service
//! - `middleware` - Internal token guard
//!
//! The WebSocket upgrade route lives in `adapters::websocket`; [`app_router`]
//! assembles everything into one router.

pub mod health;
pub mod internal;
pub mod middleware;

use axum::{middleware::from_fn_with_state, Router};
use http::HeaderValue;
use secrecy::SecretString;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::adapters::websocket::{websocket_router, WebSocketState};

pub use health::health_router;
pub use internal::{internal_router, InternalAppState};
pub use middleware::{internal_auth_middleware, InternalToken};

/// Build the complete application router.
///
/// Internal routes are only mounted when `internal_token` is set. An empty
/// `cors_origins` list allows any origin.
pub fn app_router(
    ws_state: WebSocketState,
    internal_token: Option<SecretString>,
    cors_origins: &[String],
) -> Router {
    let hub = ws_state.hub.clone();

    let mut router = Router::new()
        .merge(health_router())
        .merge(websocket_router().with_state(ws_state));

    match internal_token {
        Some(token) => {
            let internal = internal_router()
                .route_layer(from_fn_with_state(
                    InternalToken::new(token),
                    internal_auth_middleware,
                ))
                .with_state(InternalAppState::new(hub));
            router = router.merge(internal);
        }
        None => {
            tracing::info!("No internal API token configured, internal routes disabled");
        }
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
