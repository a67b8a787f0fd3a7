//! WebSocket admission handler.
//!
//! Handles the HTTP → WebSocket upgrade for board and notification streams:
//! 1. Validate the token from the `token` query parameter
//! 2. Resolve rooms: the caller's personal room, plus the board room when
//!    `board_id` is given and the board service grants access
//! 3. Upgrade, open a [`Connection`] in those rooms, and serve it
//!
//! Every rejection happens before the upgrade, so refused callers never
//! reach the hub.

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{AuthError, AuthenticatedUser, BoardId};
use crate::domain::realtime::RoomId;
use crate::ports::{BoardAccess, BoardAccessChecker, SessionValidator};

use super::connection::{Connection, ConnectionSettings};
use super::hub::HubHandle;

/// State required for WebSocket admission.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: HubHandle,
    pub validator: Arc<dyn SessionValidator>,
    pub access: Arc<dyn BoardAccessChecker>,
    pub connection_settings: ConnectionSettings,
    /// Largest inbound frame accepted from a client, in bytes.
    pub max_message_size: usize,
}

impl WebSocketState {
    pub fn new(
        hub: HubHandle,
        validator: Arc<dyn SessionValidator>,
        access: Arc<dyn BoardAccessChecker>,
    ) -> Self {
        Self {
            hub,
            validator,
            access,
            connection_settings: ConnectionSettings::default(),
            max_message_size: 512,
        }
    }

    pub fn with_connection_settings(mut self, settings: ConnectionSettings) -> Self {
        self.connection_settings = settings;
        self
    }

    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }
}

/// Query parameters for `GET /ws`.
#[derive(Debug, Default, Deserialize)]
pub struct WsConnectParams {
    pub token: Option<String>,
    pub board_id: Option<String>,
}

/// A caller that passed admission, with the rooms it may join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub user: AuthenticatedUser,
    pub rooms: Vec<RoomId>,
}

/// Reasons a connection request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Token required")]
    MissingToken,

    #[error("Invalid board ID")]
    InvalidBoardId,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AdmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdmissionError::MissingToken => StatusCode::UNAUTHORIZED,
            AdmissionError::InvalidBoardId => StatusCode::BAD_REQUEST,
            AdmissionError::Auth(AuthError::InvalidToken | AuthError::TokenExpired) => {
                StatusCode::UNAUTHORIZED
            }
            AdmissionError::Auth(AuthError::InsufficientPermissions) => StatusCode::FORBIDDEN,
            AdmissionError::Auth(AuthError::ServiceUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            AdmissionError::MissingToken => "Token required",
            AdmissionError::InvalidBoardId => "Invalid board ID",
            AdmissionError::Auth(AuthError::InvalidToken) => "Invalid token",
            AdmissionError::Auth(AuthError::TokenExpired) => "Token expired",
            AdmissionError::Auth(AuthError::InsufficientPermissions) => "Access denied to board",
            AdmissionError::Auth(AuthError::ServiceUnavailable(_)) => {
                "Authentication service unavailable"
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AdmissionError::InvalidBoardId => "BAD_REQUEST",
            AdmissionError::Auth(AuthError::InsufficientPermissions) => "FORBIDDEN",
            AdmissionError::Auth(AuthError::ServiceUnavailable(_)) => "SERVICE_UNAVAILABLE",
            _ => "AUTH_ERROR",
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({
                "error": self.client_message(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

/// Authenticate the caller and resolve the rooms it may join.
///
/// An empty `board_id` is treated as absent.
pub async fn admit(
    state: &WebSocketState,
    params: &WsConnectParams,
) -> Result<Admission, AdmissionError> {
    let token = params
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(AdmissionError::MissingToken)?;

    let user = state.validator.validate(token).await?;
    let mut rooms = vec![RoomId::user(&user.id)];

    if let Some(raw) = params.board_id.as_deref().filter(|b| !b.is_empty()) {
        let board_id: BoardId = raw.parse().map_err(|_| AdmissionError::InvalidBoardId)?;

        match state.access.check_board_access(&user.id, &board_id).await? {
            BoardAccess::Granted => rooms.push(RoomId::board(&board_id)),
            BoardAccess::Denied => return Err(AuthError::InsufficientPermissions.into()),
        }
    }

    Ok(Admission { user, rooms })
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=<token>[&board_id=<uuid>]`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let admission = match admit(&state, &params).await {
        Ok(admission) => admission,
        Err(e) => {
            match &e {
                AdmissionError::Auth(AuthError::ServiceUnavailable(reason)) => {
                    tracing::error!(%reason, "Admission dependency unavailable");
                }
                _ => tracing::debug!(error = %e, "Connection refused"),
            }
            return e.into_response();
        }
    };

    let hub = state.hub.clone();
    let settings = state.connection_settings.clone();

    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| async move {
            let Admission { user, rooms } = admission;
            let connection = Connection::open(hub, user.id, rooms, settings);
            tracing::info!(
                connection_id = %connection.id(),
                user_id = %connection.user_id(),
                rooms = ?connection.rooms(),
                "WebSocket connected"
            );
            connection.serve(socket).await;
        })
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::access::InMemoryBoardAccess;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::websocket::hub::{Hub, HubSettings};

    fn state(access: InMemoryBoardAccess) -> WebSocketState {
        let (_hub, handle) = Hub::new(HubSettings::default());
        let validator = MockSessionValidator::new().with_test_user("good-token", "alice");
        WebSocketState::new(handle, Arc::new(validator), Arc::new(access))
    }

    fn params(token: Option<&str>, board_id: Option<&str>) -> WsConnectParams {
        WsConnectParams {
            token: token.map(str::to_string),
            board_id: board_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let state = state(InMemoryBoardAccess::new());
        assert_eq!(
            admit(&state, &params(None, None)).await,
            Err(AdmissionError::MissingToken)
        );
        assert_eq!(
            admit(&state, &params(Some(""), None)).await,
            Err(AdmissionError::MissingToken)
        );
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let state = state(InMemoryBoardAccess::new());
        let result = admit(&state, &params(Some("bad-token"), None)).await;
        assert_eq!(result, Err(AdmissionError::Auth(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn token_only_joins_personal_room() {
        let state = state(InMemoryBoardAccess::new());
        let admission = admit(&state, &params(Some("good-token"), None)).await.unwrap();
        assert_eq!(admission.user.id.as_str(), "alice");
        assert_eq!(admission.rooms, vec![RoomId::new("user:alice").unwrap()]);
    }

    #[tokio::test]
    async fn empty_board_id_is_treated_as_absent() {
        let state = state(InMemoryBoardAccess::new());
        let admission = admit(&state, &params(Some("good-token"), Some(""))).await.unwrap();
        assert_eq!(admission.rooms.len(), 1);
    }

    #[tokio::test]
    async fn authorized_board_adds_board_room() {
        let board = BoardId::new();
        let access = InMemoryBoardAccess::new();
        access.grant(&crate::domain::foundation::UserId::new("alice").unwrap(), &board);
        let state = state(access);

        let admission = admit(&state, &params(Some("good-token"), Some(&board.to_string())))
            .await
            .unwrap();
        assert_eq!(
            admission.rooms,
            vec![RoomId::new("user:alice").unwrap(), RoomId::board(&board)]
        );
    }

    #[tokio::test]
    async fn unauthorized_board_is_forbidden() {
        let state = state(InMemoryBoardAccess::new());
        let board = BoardId::new().to_string();
        let err = admit(&state, &params(Some("good-token"), Some(&board)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_board_id_is_bad_request() {
        let state = state(InMemoryBoardAccess::allow_all());
        let err = admit(&state, &params(Some("good-token"), Some("not-a-uuid")))
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::InvalidBoardId);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_unavailable_maps_to_503() {
        let err = AdmissionError::from(AuthError::service_unavailable("down"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AdmissionError::Auth(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn websocket_router_creates_route() {
        let _router: Router<WebSocketState> = websocket_router();
    }
}
