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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid listen address: {0}")]
    InvalidListenAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("AdMob key server URL must use HTTPS")]
    KeyServerMustBeHttps,

    #[error("AdMob key cache TTL must be between 1 second and 24 hours")]
    InvalidKeyCacheTtl,

    #[error("AdMob key fetch timeout must be between 1 and 60 seconds")]
    InvalidFetchTimeout,

    #[error("Idempotency TTL must be at least one day")]
    IdempotencyTtlTooShort,

    #[error("Idempotency TTL must be at most one year")]
    IdempotencyTtlTooLong,

    #[error("Request timeout must exceed the AdMob key fetch timeout")]
    RequestTimeoutTooShort,

    #[error("{0} secret is set but empty")]
    EmptySecret(&'static str),
}
