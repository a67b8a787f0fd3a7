//! Board access configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// How admission decides whether a user may watch a board
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Ask the board service over HTTP
    #[default]
    Http,
    /// Grant every authenticated user every board (development only)
    AllowAll,
}

/// Board access configuration
#[derive(Clone, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub mode: AccessMode,

    /// Board service base URL, required in `http` mode
    pub base_url: Option<String>,

    /// Bearer token presented to the board service
    pub service_token: Option<String>,

    /// Per-check timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AccessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn service_token(&self) -> Option<SecretString> {
        self.service_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::new(t.clone()))
    }

    /// Validate access configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        match self.mode {
            AccessMode::AllowAll if *environment == Environment::Production => {
                Err(ValidationError::AllowAllInProduction)
            }
            AccessMode::AllowAll => Ok(()),
            AccessMode::Http => {
                let url = self
                    .base_url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .ok_or(ValidationError::MissingRequired("ACCESS__BASE_URL"))?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ValidationError::InvalidAccessUrl(url.to_string()));
                }
                if self.timeout_secs == 0 {
                    return Err(ValidationError::MustBePositive("access.timeout_secs"));
                }
                Ok(())
            }
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            mode: AccessMode::default(),
            base_url: None,
            service_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("mode", &self.mode)
            .field("base_url", &self.base_url)
            .field("service_token", &self.service_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout() -> u64 {
    5
}
