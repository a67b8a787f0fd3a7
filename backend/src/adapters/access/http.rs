//! Board service client for admission-time access checks.
//!
//! Calls `GET {base}/internal/boards/{board_id}/members/{user_id}`:
//! - 2xx: the user may watch the board
//! - 403 / 404: the user may not
//! - anything else, or no answer within the timeout: unavailable

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::domain::foundation::{AuthError, BoardId, UserId};
use crate::ports::{BoardAccess, BoardAccessChecker};

/// Errors building the board service client.
#[derive(Debug, Error)]
pub enum AccessClientError {
    #[error("invalid board service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// `BoardAccessChecker` backed by the board service's HTTP API.
pub struct HttpBoardAccessChecker {
    base_url: Url,
    service_token: Option<SecretString>,
    http_client: reqwest::Client,
}

impl HttpBoardAccessChecker {
    pub fn new(
        base_url: &str,
        service_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, AccessClientError> {
        let base_url = Url::parse(base_url).map_err(|e| AccessClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AccessClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            service_token,
            http_client,
        })
    }

    fn member_url(&self, user_id: &UserId, board_id: &BoardId) -> Result<Url, AuthError> {
        let mut url = self.base_url.clone();
        let board = board_id.to_string();
        url.path_segments_mut()
            .map_err(|_| AuthError::service_unavailable("board service URL cannot be a base"))?
            .pop_if_empty()
            .extend(["internal", "boards", board.as_str(), "members", user_id.as_str()]);
        Ok(url)
    }
}

impl std::fmt::Debug for HttpBoardAccessChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBoardAccessChecker")
            .field("base_url", &self.base_url.as_str())
            .field("service_token", &self.service_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait]
impl BoardAccessChecker for HttpBoardAccessChecker {
    async fn check_board_access(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<BoardAccess, AuthError> {
        let url = self.member_url(user_id, board_id)?;

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, %board_id, "Board access check failed");
            AuthError::service_unavailable(format!("board service request failed: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(BoardAccess::Granted);
        }

        match status {
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::debug!(%user_id, %board_id, %status, "Board access denied");
                Ok(BoardAccess::Denied)
            }
            _ => {
                tracing::warn!(%board_id, %status, "Board service returned unexpected status");
                Err(AuthError::service_unavailable(format!(
                    "board service returned {}",
                    status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Router,
    };

    /// Board service stand-in: "member" is granted, "outsider" is 403,
    /// "ghost" is 404, "broken" is 500. Requires the service token when
    /// the caller presents one.
    async fn spawn_board_service() -> String {
        async fn member(
            Path((_board, user)): Path<(String, String)>,
            headers: HeaderMap,
        ) -> AxumStatus {
            if let Some(auth) = headers.get("authorization") {
                if auth != "Bearer svc-token" {
                    return AxumStatus::UNAUTHORIZED;
                }
            }
            match user.as_str() {
                "member" => AxumStatus::NO_CONTENT,
                "outsider" => AxumStatus::FORBIDDEN,
                "ghost" => AxumStatus::NOT_FOUND,
                _ => AxumStatus::INTERNAL_SERVER_ERROR,
            }
        }

        let app = Router::new().route("/internal/boards/:board/members/:user", get(member));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn checker(base: &str, token: Option<&str>) -> HttpBoardAccessChecker {
        HttpBoardAccessChecker::new(
            base,
            token.map(|t| SecretString::new(t.to_string())),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn success_status_grants_access() {
        let base = spawn_board_service().await;
        let result = checker(&base, None)
            .check_board_access(&user("member"), &BoardId::new())
            .await;
        assert_eq!(result, Ok(BoardAccess::Granted));
    }

    #[tokio::test]
    async fn forbidden_and_not_found_deny_access() {
        let base = spawn_board_service().await;
        let checker = checker(&base, None);
        let board = BoardId::new();

        assert_eq!(
            checker.check_board_access(&user("outsider"), &board).await,
            Ok(BoardAccess::Denied)
        );
        assert_eq!(
            checker.check_board_access(&user("ghost"), &board).await,
            Ok(BoardAccess::Denied)
        );
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let base = spawn_board_service().await;
        let result = checker(&base, None)
            .check_board_access(&user("broken"), &BoardId::new())
            .await;
        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn service_token_is_sent_as_bearer() {
        let base = spawn_board_service().await;
        let board = BoardId::new();

        let ok = checker(&base, Some("svc-token"))
            .check_board_access(&user("member"), &board)
            .await;
        assert_eq!(ok, Ok(BoardAccess::Granted));

        // 401 from the board service is not a membership answer.
        let wrong = checker(&base, Some("wrong"))
            .check_board_access(&user("member"), &board)
            .await;
        assert!(matches!(wrong, Err(AuthError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = checker(&format!("http://{}", addr), None)
            .check_board_access(&user("member"), &BoardId::new())
            .await;
        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
    }

    #[test]
    fn member_url_keeps_base_path_and_escapes_segments() {
        let checker = checker("http://boards.internal/api/", None);
        let board = BoardId::new();

        let url = checker.member_url(&user("a/b"), &board).unwrap();

        assert_eq!(
            url.as_str(),
            format!("http://boards.internal/api/internal/boards/{}/members/a%2Fb", board)
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = HttpBoardAccessChecker::new("not a url", None, Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(AccessClientError::InvalidBaseUrl { .. })
        ));

        let result = HttpBoardAccessChecker::new("mailto:x@y.z", None, Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(AccessClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn debug_redacts_service_token() {
        let checker = checker("http://boards.internal", Some("super-secret"));
        let debug = format!("{:?}", checker);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
