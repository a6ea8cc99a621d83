//! Error types for reward callback verification and entitlement granting.
//!
//! The HTTP status of each error decides whether the ad network retries
//! the callback:
//!
//! | Error | HTTP Status | Retried |
//! |-------|-------------|---------|
//! | InvalidInput | 400 | no |
//! | BadRequest | 400 | no |
//! | Forbidden | 403 | no |
//! | ServerException | 500 | yes |
//! | OperationFailed | 500 | yes |

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ValidationError};

/// Errors raised while verifying a reward callback or granting its reward.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    /// Callback is malformed, unsigned, or its signature does not match.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reward type or value is not recognized.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Reward type is disabled or not permitted.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The service is misconfigured (unconfigured provider, missing secret).
    #[error("Server exception: {0}")]
    ServerException(String),

    /// An infrastructure call failed (key fetch, storage).
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl RewardError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RewardError::InvalidInput(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RewardError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        RewardError::Forbidden(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        RewardError::ServerException(message.into())
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        RewardError::OperationFailed(message.into())
    }

    /// Error for a required callback parameter that is absent or blank.
    pub fn missing_parameter(name: &str) -> Self {
        RewardError::InvalidInput(format!("Missing required parameter: {}", name))
    }

    /// Stable error code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RewardError::InvalidInput(_) => "INVALID_INPUT",
            RewardError::BadRequest(_) => "BAD_REQUEST",
            RewardError::Forbidden(_) => "FORBIDDEN",
            RewardError::ServerException(_) => "SERVER_EXCEPTION",
            RewardError::OperationFailed(_) => "OPERATION_FAILED",
        }
    }

    /// The message without its category prefix.
    pub fn message(&self) -> &str {
        match self {
            RewardError::InvalidInput(m)
            | RewardError::BadRequest(m)
            | RewardError::Forbidden(m)
            | RewardError::ServerException(m)
            | RewardError::OperationFailed(m) => m,
        }
    }

    /// Returns true if the ad network should retry delivering this callback.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RewardError::ServerException(_) | RewardError::OperationFailed(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: callback rejected, the network does not retry
    /// - 5xx: infrastructure failure, the network retries
    pub fn status_code(&self) -> StatusCode {
        match self {
            RewardError::InvalidInput(_) | RewardError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RewardError::Forbidden(_) => StatusCode::FORBIDDEN,
            RewardError::ServerException(_) | RewardError::OperationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationError> for RewardError {
    fn from(err: ValidationError) -> Self {
        RewardError::InvalidInput(err.to_string())
    }
}

/// Storage failures surface as retryable infrastructure errors.
impl From<DomainError> for RewardError {
    fn from(err: DomainError) -> Self {
        RewardError::OperationFailed(err.to_string())
    }
}
