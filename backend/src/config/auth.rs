//! Authentication configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest HS256 secret accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 session tokens)
#[derive(Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret the board service signs session tokens with
    #[serde(default)]
    pub jwt_secret: String,
}

impl AuthConfig {
    /// The secret, wrapped so it stays out of logs.
    pub fn jwt_secret(&self) -> SecretString {
        SecretString::new(self.jwt_secret.clone())
    }

    /// Validate authentication configuration
    ///
    /// In production the secret must be at least
    /// [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }

        if *environment == Environment::Production
            && self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::JwtSecretTooShort {
                min: MIN_PRODUCTION_SECRET_LEN,
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
        }
    }

    #[test]
    fn test_missing_secret_fails() {
        assert_eq!(
            config("").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_short_secret_allowed_in_development() {
        assert!(config("dev").validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        assert!(matches!(
            config("dev").validate(&Environment::Production),
            Err(ValidationError::JwtSecretTooShort { .. })
        ));
        assert!(config(&"x".repeat(32))
            .validate(&Environment::Production)
            .is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", config("super-secret-value"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_jwt_secret_wraps_value() {
        assert_eq!(config("abc").jwt_secret().expose_secret(), "abc");
    }
}
