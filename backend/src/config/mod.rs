//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `NEXUS_REALTIME` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use nexus_realtime::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod access;
mod auth;
mod error;
mod internal;
mod realtime;
mod server;

pub use access::{AccessConfig, AccessMode};
pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use internal::InternalConfig;
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Session token verification
    #[serde(default)]
    pub auth: AuthConfig,

    /// Board access checks at admission
    #[serde(default)]
    pub access: AccessConfig,

    /// Hub and connection tuning
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Internal publish API
    #[serde(default)]
    pub internal: InternalConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `NEXUS_REALTIME` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `NEXUS_REALTIME__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `NEXUS_REALTIME__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NEXUS_REALTIME")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = &self.server.environment;
        self.server.validate()?;
        self.auth.validate(environment)?;
        self.access.validate(environment)?;
        self.realtime.validate()?;
        self.internal.validate(environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::SlowConsumerPolicy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "NEXUS_REALTIME__AUTH__JWT_SECRET",
        "NEXUS_REALTIME__ACCESS__MODE",
        "NEXUS_REALTIME__ACCESS__BASE_URL",
        "NEXUS_REALTIME__SERVER__PORT",
        "NEXUS_REALTIME__SERVER__ENVIRONMENT",
        "NEXUS_REALTIME__REALTIME__SEND_BUFFER",
        "NEXUS_REALTIME__REALTIME__SLOW_CONSUMER_POLICY",
        "NEXUS_REALTIME__INTERNAL__API_TOKEN",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("NEXUS_REALTIME__AUTH__JWT_SECRET", "test-secret");
        env::set_var("NEXUS_REALTIME__ACCESS__BASE_URL", "http://localhost:8081");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.auth.jwt_secret, "test-secret");
        assert_eq!(
            config.access.base_url.as_deref(),
            Some("http://localhost:8081")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.access.mode, AccessMode::Http);
        assert_eq!(config.realtime.send_buffer, 256);
        assert_eq!(config.realtime.slow_consumer_policy, SlowConsumerPolicy::Evict);
        assert!(config.internal.api_token().is_none());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NEXUS_REALTIME__SERVER__PORT", "3000");
        env::set_var("NEXUS_REALTIME__ACCESS__MODE", "allow_all");
        env::set_var("NEXUS_REALTIME__REALTIME__SEND_BUFFER", "64");
        env::set_var("NEXUS_REALTIME__REALTIME__SLOW_CONSUMER_POLICY", "drop_message");
        env::set_var("NEXUS_REALTIME__INTERNAL__API_TOKEN", "internal-token");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.access.mode, AccessMode::AllowAll);
        assert_eq!(config.realtime.send_buffer, 64);
        assert_eq!(
            config.realtime.slow_consumer_policy,
            SlowConsumerPolicy::DropMessage
        );
        assert!(config.internal.api_token().is_some());
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("NEXUS_REALTIME__ACCESS__BASE_URL", "http://localhost:8081");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_production_rules() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NEXUS_REALTIME__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::JwtSecretTooShort { .. })
        ));
    }
}
