/// Anthropic Messages API provider
///
/// Sends the transcript as-is to `POST /v1/messages` and returns the text of
/// the first text content block. One attempt per call; the caller owns any
/// retry policy.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{ChatMessage, CompletionProvider, ProviderError};

/// Messages endpoint
pub const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default reply budget
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Provider settings
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Reply budget
    pub max_tokens: u32,

    /// HTTP client timeout
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Settings with default model, budget and a 30 second timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`CompletionProvider`] backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicProvider {
    /// Builds the HTTP client with auth headers baked in
    ///
    /// # Errors
    ///
    /// `ProviderError::NotConfigured` if the key is blank or not a valid
    /// header value.
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured);
        }

        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key).map_err(|_| ProviderError::NotConfigured)?;
        key_value.set_sensitive(true);
        headers.insert("x-api-key", key_value);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            model: config.model,
            max_tokens: config.max_tokens,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Points the provider at another endpoint
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Model identifier in use
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        tracing::debug!(status = %status, model = %self.model, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("{}: {}", api_err.error.error_type, api_err.error.message),
                Err(_) => body,
            };
            tracing::warn!(status = %status, "completion provider returned an error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessageResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("failed to parse response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::Malformed("response has no text content".to_string()))
    }
}
