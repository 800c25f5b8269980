/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check and banner
/// - `auth`: Signup, login and profile
/// - `todos`: Owner-scoped todo CRUD, toggle and stats
/// - `chat`: Stateless chat relay

pub mod auth;
pub mod chat;
pub mod health;
pub mod todos;
