//! HTTP handlers for the internal publish API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::websocket::HubHandle;
use crate::domain::foundation::UserId;
use crate::domain::realtime::RoomId;
use crate::ports::RealtimePublisher;

use super::dto::{ErrorResponse, PublishAccepted, PublishRequest, StatsResponse};

/// State for internal routes.
#[derive(Clone)]
pub struct InternalAppState {
    pub hub: HubHandle,
}

impl InternalAppState {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("BAD_REQUEST", message)),
    )
        .into_response()
}

fn accept(hub: &HubHandle, room: RoomId, request: PublishRequest) -> Response {
    if request.kind.trim().is_empty() {
        return bad_request("Event type is required");
    }

    tracing::debug!(%room, kind = %request.kind, "Internal publish");
    hub.publish_to_room(&room, &request.kind, request.payload);

    (
        StatusCode::ACCEPTED,
        Json(PublishAccepted {
            room: room.to_string(),
            kind: request.kind,
        }),
    )
        .into_response()
}

/// POST /internal/rooms/:room/events
pub async fn publish_to_room(
    State(state): State<InternalAppState>,
    Path(room): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Response {
    match RoomId::new(room) {
        Ok(room) => accept(&state.hub, room, request),
        Err(e) => bad_request(e.to_string()),
    }
}

/// POST /internal/users/:user_id/events
pub async fn publish_to_user(
    State(state): State<InternalAppState>,
    Path(user_id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Response {
    match UserId::new(user_id) {
        Ok(user_id) => accept(&state.hub, RoomId::user(&user_id), request),
        Err(e) => bad_request(e.to_string()),
    }
}

/// GET /internal/stats
pub async fn get_stats(State(state): State<InternalAppState>) -> Response {
    match state.hub.snapshot().await {
        Some(snapshot) => Json(StatsResponse::from(snapshot)).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("SERVICE_UNAVAILABLE", "Hub is not running")),
        )
            .into_response(),
    }
}
