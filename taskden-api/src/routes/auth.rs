/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/signup` - Register new identity (JSON)
/// - `POST /auth/login` - Exchange credentials for a bearer token (form-encoded)
/// - `GET /api/profile` - Caller's identity record

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Form, Json};
use serde::Deserialize;
use taskden_shared::{
    auth::{jwt::IssuedToken, middleware::AuthContext},
    models::User,
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (further checked against the configured minimum length)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login form, OAuth2 password-grant shape
///
/// `username` carries the email. Extra OAuth2 fields (`grant_type`, `scope`)
/// are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address
    pub username: String,

    /// Password
    pub password: String,
}

/// Register a new identity
///
/// # Endpoint
///
/// ```text
/// POST /auth/signup
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "pw123",
///   "name": "Alice"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{id, email, name, created_at}`.
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = state.auth.signup(&req.email, &req.password, req.name).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login and get a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice@example.com&password=pw123
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer",
///   "expires_in": 1800
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<IssuedToken>> {
    let token = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(token))
}

/// Caller's identity record
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = state
        .auth
        .credentials()
        .find_by_id(auth.user_id)
        .await
        .ok_or_else(|| ApiError::Unauthorized("identity no longer exists".to_string()))?;

    Ok(Json(user))
}
