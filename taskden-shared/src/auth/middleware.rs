/// Request-level authentication context
///
/// The API's auth layer resolves the bearer token through the
/// [`AuthGateway`](super::gateway::AuthGateway) and inserts an
/// [`AuthContext`] into request extensions. Handlers read it with Axum's
/// `Extension` extractor and never see the token itself.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskden_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gateway::AuthGateway;
use crate::error::{CoreError, CoreResult};

/// Authenticated identity for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Identity key of the caller
    pub user_id: Uuid,

    /// Caller's normalized email
    pub email: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively. Returns `None` when the header
/// is absent, not ASCII, uses another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolves request headers to an [`AuthContext`]
///
/// # Errors
///
/// `CoreError::InvalidToken` when no usable bearer token is present, plus
/// whatever [`AuthGateway::authorize`] reports.
pub async fn authenticate(gateway: &AuthGateway, headers: &HeaderMap) -> CoreResult<AuthContext> {
    let token = bearer_token(headers).ok_or(CoreError::InvalidToken)?;
    let user = gateway.authorize(token).await?;

    Ok(AuthContext {
        user_id: user.id,
        email: user.email,
    })
}
