//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("JWT secret must be at least {min} bytes in production")]
    JwtSecretTooShort { min: usize },

    #[error("Internal API token must be at least {min} bytes in production")]
    InternalTokenTooShort { min: usize },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Ping interval must be shorter than the pong timeout")]
    PingIntervalTooLong,

    #[error("Access mode allow_all is not permitted in production")]
    AllowAllInProduction,

    #[error("Invalid board service URL: {0}")]
    InvalidAccessUrl(String),
}
