//! HS256 JWT adapter for connection tokens.
//!
//! Tokens are issued by the board service's login flow and signed with a
//! shared secret. A valid token carries a `user_id` claim and an `exp` claim;
//! any other algorithm in the header is rejected outright.

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::ports::SessionValidator;

/// Claims carried by a connection token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    user_id: String,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    name: Option<String>,
}

/// Validates HS256-signed session tokens against a shared secret.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString) -> Self {
        let raw = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(raw),
            encoding_key: EncodingKey::from_secret(raw),
            validation,
        }
    }

    /// Sign a token for `user_id` that expires after `ttl`.
    ///
    /// Used by tests and by operators minting tokens for smoke checks.
    pub fn issue(
        &self,
        user_id: &UserId,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Timestamp::now();
        let claims = SessionClaims {
            user_id: user_id.as_str().to_string(),
            exp: now.unix_seconds() + ttl.num_seconds(),
            iat: Some(now.unix_seconds()),
            name: None,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            },
        )?;

        let claims = data.claims;
        let user_id = UserId::new(claims.user_id).map_err(|_| {
            tracing::warn!("Token carries an empty user_id claim");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(secret: &str) -> JwtSessionValidator {
        JwtSessionValidator::new(&SecretString::new(secret.to_string()))
    }

    fn alice() -> UserId {
        UserId::new("6f1c2a4e-8d1b-4a53-9d7e-3f2b1c0a9e88").unwrap()
    }

    #[tokio::test]
    async fn issued_token_validates() {
        let v = validator("test-secret");
        let token = v.issue(&alice(), Duration::hours(24)).unwrap();

        let user = v.validate(&token).await.unwrap();
        assert_eq!(user.id, alice());
        assert_eq!(user.display_name, None);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let v = validator("test-secret");
        let token = v.issue(&alice(), Duration::hours(-1)).unwrap();

        assert_eq!(v.validate(&token).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_invalid() {
        let token = validator("other-secret")
            .issue(&alice(), Duration::hours(1))
            .unwrap();

        let result = validator("test-secret").validate(&token).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let v = validator("test-secret");
        assert_eq!(v.validate("not-a-jwt").await, Err(AuthError::InvalidToken));
        assert_eq!(v.validate("").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn other_algorithms_are_rejected() {
        let claims = SessionClaims {
            user_id: "alice".to_string(),
            exp: Timestamp::now().unix_seconds() + 3600,
            iat: None,
            name: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = validator("test-secret").validate(&token).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn empty_user_id_claim_is_invalid() {
        let claims = SessionClaims {
            user_id: String::new(),
            exp: Timestamp::now().unix_seconds() + 3600,
            iat: None,
            name: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = validator("test-secret").validate(&token).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn name_claim_becomes_display_name() {
        let claims = SessionClaims {
            user_id: "alice".to_string(),
            exp: Timestamp::now().unix_seconds() + 3600,
            iat: None,
            name: Some("Alice".to_string()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let user = validator("test-secret").validate(&token).await.unwrap();
        assert_eq!(user.display_name_or_id(), "Alice");
    }
}
