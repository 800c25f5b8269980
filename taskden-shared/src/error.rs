/// Error taxonomy for stores and gateways
///
/// Every fallible domain operation returns [`CoreError`]. The variants are
/// deliberately coarse: callers translate them to transport codes only at the
/// outermost boundary.
///
/// Authentication failures come in three flavours (`InvalidCredentials`,
/// `InvalidToken`, `ExpiredToken`) so that logs stay useful; the HTTP layer
/// collapses them into one uniform response.

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::chat::provider::ProviderError;

/// Result alias for domain operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Domain error kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Bad input shape or content, fixable by the client
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate registration
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed token, bad signature, or unknown subject
    #[error("Invalid token")]
    InvalidToken,

    /// Token is past its expiry
    #[error("Token has expired")]
    ExpiredToken,

    /// Missing, or owned by someone else
    #[error("Not found")]
    NotFound,

    /// Completion provider failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Missing secret or provider key
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected failure inside the service
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

impl From<JwtError> for CoreError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => CoreError::ExpiredToken,
            JwtError::CreateError(msg) => CoreError::Internal(msg),
            JwtError::Invalid(_) => CoreError::InvalidToken,
        }
    }
}

impl From<ProviderError> for CoreError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured => {
                CoreError::Configuration("Chat provider is not configured".to_string())
            }
            other => CoreError::Upstream(other.client_message()),
        }
    }
}
