/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "chat": "configured"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Chat relay status: "configured" or "not_configured"
    pub chat: String,
}

/// Health check handler
///
/// The stores are in-process, so the service is healthy whenever it answers;
/// a missing provider key only shows up in the `chat` field.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let chat = if state.chat.is_configured() {
        "configured"
    } else {
        "not_configured"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chat: chat.to_string(),
    })
}

/// API banner
pub async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Taskden API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
