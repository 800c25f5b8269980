/// Stateless chat relay
///
/// Threads a caller-owned transcript through one completion call:
///
/// ```text
/// outbound = history ++ [user: message]
/// reply    = provider(outbound)          (single attempt, bounded by timeout)
/// result   = outbound ++ [assistant: reply]
/// ```
///
/// On any failure nothing is returned but the error; the caller's transcript
/// is left exactly as it was. The relay stores nothing between calls.
///
/// # Example
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
/// use taskden_shared::chat::{
///     anthropic::{AnthropicConfig, AnthropicProvider},
///     relay::ChatRelay,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = AnthropicProvider::new(AnthropicConfig::new("sk-..."))?;
/// let relay = ChatRelay::new(Some(Arc::new(provider)), Duration::from_secs(30));
///
/// let exchange = relay.relay("hi", Vec::new()).await?;
/// assert_eq!(exchange.conversation_history.len(), 2);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

use super::provider::{ChatMessage, CompletionProvider, ProviderError};
use crate::error::{CoreError, CoreResult};

/// Maximum inbound message length in characters
pub const MAX_MESSAGE_LEN: usize = 8000;

/// Result of one relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
    /// Reply text alone
    pub response: String,

    /// Full updated transcript
    pub conversation_history: Vec<ChatMessage>,
}

/// Relay over an optional provider
///
/// A relay without a provider answers every call with
/// `CoreError::Configuration`, which keeps the rest of the service running
/// when no API key is set.
#[derive(Clone)]
pub struct ChatRelay {
    provider: Option<Arc<dyn CompletionProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatRelay {
    /// Creates a relay; `None` means chat is not configured
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// A relay with no provider
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    /// Whether a provider is wired in
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Sends `message` after `history` and returns the extended transcript
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for a blank or overlong message
    /// - `CoreError::Configuration` when no provider is configured
    /// - `CoreError::Upstream` on provider failure or timeout
    pub async fn relay(&self, message: &str, history: Vec<ChatMessage>) -> CoreResult<ChatExchange> {
        if message.trim().is_empty() {
            return Err(CoreError::Validation("Message must not be empty".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(CoreError::Validation(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        let provider = self.provider.as_ref().ok_or(ProviderError::NotConfigured)?;

        let mut transcript = history;
        transcript.push(ChatMessage::user(message));

        let reply = match tokio::time::timeout(self.timeout, provider.complete(&transcript)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(provider = provider.name(), error = %e, "completion failed");
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(provider = provider.name(), timeout = ?self.timeout, "completion timed out");
                return Err(ProviderError::Timeout.into());
            }
        };

        transcript.push(ChatMessage::assistant(reply.clone()));
        tracing::debug!(turns = transcript.len(), "chat relayed");

        Ok(ChatExchange {
            response: reply,
            conversation_history: transcript,
        })
    }
}
