//! Axum router configuration for internal endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_stats, publish_to_room, publish_to_user, InternalAppState};

/// Create the internal API router.
///
/// # Routes
/// - `POST /internal/rooms/:room/events` - Publish to a room
/// - `POST /internal/users/:user_id/events` - Publish to a personal room
/// - `GET /internal/stats` - Registry statistics
///
/// The router carries no guard of its own; the caller layers
/// `internal_auth_middleware` on top.
pub fn internal_router() -> Router<InternalAppState> {
    Router::new()
        .route("/internal/rooms/:room/events", post(publish_to_room))
        .route("/internal/users/:user_id/events", post(publish_to_user))
        .route("/internal/stats", get(get_stats))
}
