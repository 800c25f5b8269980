/// Middleware modules for the API server
///
/// - `auth`: `require_auth`, bearer token authentication
/// - `security`: security response headers

pub mod auth;
pub mod security;
