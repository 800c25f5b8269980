/// Chat relay
///
/// - [`provider`]: transcript types and the [`provider::CompletionProvider`] seam
/// - [`anthropic`]: Anthropic Messages API provider
/// - [`relay`]: the stateless relay that threads a transcript through one call

pub mod anthropic;
pub mod provider;
pub mod relay;

pub use provider::{ChatMessage, CompletionProvider, ProviderError, Role};
pub use relay::{ChatExchange, ChatRelay};
