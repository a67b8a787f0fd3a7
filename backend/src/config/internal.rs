//! Internal API configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest internal API token accepted in production.
pub const MIN_PRODUCTION_TOKEN_LEN: usize = 16;

/// Internal publish API configuration
#[derive(Clone, Deserialize, Default)]
pub struct InternalConfig {
    /// Bearer token the board service presents; unset disables the internal routes
    pub api_token: Option<String>,
}

impl InternalConfig {
    pub fn api_token(&self) -> Option<SecretString> {
        self.api_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::new(t.clone()))
    }

    /// Validate internal API configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if let Some(token) = self.api_token.as_deref().filter(|t| !t.is_empty()) {
            if *environment == Environment::Production && token.len() < MIN_PRODUCTION_TOKEN_LEN {
                return Err(ValidationError::InternalTokenTooShort {
                    min: MIN_PRODUCTION_TOKEN_LEN,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InternalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> InternalConfig {
        InternalConfig {
            api_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_unset_or_empty_token_disables_routes() {
        assert!(config(None).api_token().is_none());
        assert!(config(Some("")).api_token().is_none());
        assert!(config(Some("token")).api_token().is_some());
    }

    #[test]
    fn test_short_token_rejected_in_production() {
        assert!(config(Some("short"))
            .validate(&Environment::Development)
            .is_ok());
        assert!(config(Some("short"))
            .validate(&Environment::Production)
            .is_err());
        assert!(config(Some("a-long-enough-internal-token"))
            .validate(&Environment::Production)
            .is_ok());
    }
}
