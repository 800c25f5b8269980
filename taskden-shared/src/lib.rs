//! # Taskden Shared Library
//!
//! This crate contains the domain types, stores and authentication logic used by
//! the Taskden API server.
//!
//! ## Module Organization
//!
//! - `models`: Identity and todo records with their in-memory stores
//! - `auth`: Password hashing, token signing, the auth gateway and request auth context
//! - `chat`: Stateless chat relay and completion providers
//! - `error`: Error taxonomy shared by stores and gateways

pub mod auth;
pub mod chat;
pub mod error;
pub mod models;

/// Current version of the Taskden shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
