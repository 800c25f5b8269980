/// Chat relay endpoint
///
/// # Endpoint
///
/// ```text
/// POST /chat
/// Content-Type: application/json
///
/// {
///   "message": "What should I do first?",
///   "conversation_history": [
///     {"role": "user", "content": "hi"},
///     {"role": "assistant", "content": "Hello!"}
///   ]
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "response": "...",
///   "conversation_history": [ ...history, user turn, assistant turn ]
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No valid bearer token (when auth is required)
/// - `422 Unprocessable Entity`: Empty or oversized message
/// - `502 Bad Gateway`: Provider failed or timed out
/// - `503 Service Unavailable`: No provider key configured

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use taskden_shared::{
    auth::middleware::AuthContext,
    chat::{ChatExchange, ChatMessage},
};
use validator::Validate;

/// Chat request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChatRequest {
    /// New user message
    #[validate(length(min = 1, max = 8000, message = "Message must be 1-8000 characters"))]
    pub message: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// Relay one message through the completion provider
pub async fn chat(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatExchange>> {
    req.validate()?;

    if let Some(Extension(auth)) = &auth {
        tracing::debug!(
            user_id = %auth.user_id,
            turns = req.conversation_history.len(),
            "relaying chat message"
        );
    }

    let exchange = state
        .chat
        .relay(&req.message, req.conversation_history)
        .await?;

    Ok(Json(exchange))
}
