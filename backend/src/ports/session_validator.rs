//! Session validation port for token validation.
//!
//! Admission calls this before a connection object exists. It is
//! provider-agnostic: the server ships an HS256 implementation, tests use a
//! mock, and an OIDC provider could be plugged in without touching the hub.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature and expiry
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token and return the authenticated user.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct TestSessionValidator {
        tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            self.tokens
                .read()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn session_validator_is_usable_as_trait_object() {
        let mut tokens = HashMap::new();
        tokens.insert(
            "token".to_string(),
            AuthenticatedUser::new(UserId::new("alice").unwrap(), None),
        );
        let validator: std::sync::Arc<dyn SessionValidator> = std::sync::Arc::new(
            TestSessionValidator {
                tokens: RwLock::new(tokens),
            },
        );

        assert_eq!(
            validator.validate("token").await.unwrap().id.as_str(),
            "alice"
        );
        assert_eq!(
            validator.validate("other").await,
            Err(AuthError::InvalidToken)
        );
    }
}
