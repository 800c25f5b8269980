/// Completion provider contract
///
/// A provider takes an ordered list of turns and returns one assistant reply,
/// or fails. It is called exactly once per relay; retries, if any, are the
/// provider client's own business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side
    User,

    /// The model side
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    /// Who spoke
    pub role: Role,

    /// What was said
    pub content: String,
}

impl ChatMessage {
    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Provider failure kinds
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No API key configured
    #[error("Provider is not configured")]
    NotConfigured,

    /// Call did not finish in time
    #[error("Provider call timed out")]
    Timeout,

    /// Transport-level failure
    #[error("Provider request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status (auth, quota, overload, ...)
    #[error("Provider returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Provider's error message
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Message safe to show to clients
    ///
    /// Never includes provider bodies, keys or transport internals.
    pub fn client_message(&self) -> String {
        match self {
            ProviderError::NotConfigured => "Chat provider is not configured".to_string(),
            ProviderError::Timeout => "Chat provider timed out".to_string(),
            ProviderError::Transport(_) => "Chat provider could not be reached".to_string(),
            ProviderError::Status { status, .. } => match status {
                401 | 403 => "Chat provider rejected the service credentials".to_string(),
                429 => "Chat provider quota exceeded, try again later".to_string(),
                _ => format!("Chat provider returned status {}", status),
            },
            ProviderError::Malformed(_) => "Chat provider returned an unexpected response".to_string(),
        }
    }
}

/// Black-box completion backend
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Produces one assistant reply for `messages`
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}
