/// Bearer token authentication middleware
///
/// Resolves `Authorization: Bearer <token>` through the auth gateway and
/// injects an [`AuthContext`] into request extensions. Missing, malformed,
/// forged and expired tokens all fail with the same 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskden_shared::auth::middleware::authenticate;

use crate::{app::AppState, error::ApiError};

pub use taskden_shared::auth::middleware::AuthContext;

/// Rejects the request unless it carries a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(&state.auth, req.headers()).await?;

    tracing::debug!(user_id = %auth_context.user_id, "request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
