//! Shared-secret guard for internal routes.
//!
//! The board service authenticates with a static bearer token:
//!
//! ```text
//! Authorization: Bearer <internal api token>
//! ```
//!
//! The comparison runs in constant time so response timing reveals nothing
//! about how much of a guessed token was right.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// The expected internal API token.
#[derive(Clone)]
pub struct InternalToken(Arc<SecretString>);

impl InternalToken {
    pub fn new(token: SecretString) -> Self {
        Self(Arc::new(token))
    }

    /// Constant-time comparison against a presented token.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.expose_secret().as_bytes();
        bool::from(expected.ct_eq(presented.as_bytes()))
    }
}

impl std::fmt::Debug for InternalToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InternalToken([REDACTED])")
    }
}

/// Rejects requests that do not carry the internal bearer token.
pub async fn internal_auth_middleware(
    State(expected): State<InternalToken>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| expected.matches(token));

    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected internal request with wrong token");
            unauthorized("Invalid internal token")
        }
        None => unauthorized("Internal token required"),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": "AUTH_ERROR"
        })),
    )
        .into_response()
}
