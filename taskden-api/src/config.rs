/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `SECRET_KEY`: Token signing secret, at least 32 bytes (required)
/// - `TOKEN_TTL_MINUTES`: Access token lifetime, at most one year (default: 30)
/// - `PASSWORD_MIN_LENGTH`: Minimum password length (default: 1)
/// - `ANTHROPIC_API_KEY`: Completion provider key (optional; chat disabled without it)
/// - `CHAT_MODEL`: Model identifier (default: claude-sonnet-4-5-20250929)
/// - `CHAT_MAX_TOKENS`: Reply budget (default: 1000)
/// - `CHAT_TIMEOUT_SECS`: Upstream call bound (default: 30)
/// - `CHAT_REQUIRE_AUTH`: Whether `/chat` needs a bearer token (default: true)
/// - `CORS_ORIGINS`: Comma-separated origins, `*` for permissive (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskden_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use taskden_shared::chat::anthropic::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound on `TOKEN_TTL_MINUTES` (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Token and password policy
    pub auth: AuthConfig,

    /// Chat relay configuration
    pub chat: ChatConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Token and password policy
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,

    /// Minimum password length in characters
    pub password_min_length: usize,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("password_min_length", &self.password_min_length)
            .finish()
    }
}

/// Chat relay configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Provider API key; `None` disables the chat endpoint
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Reply budget
    pub max_tokens: u32,

    /// Upstream call bound in seconds
    pub timeout_secs: u64,

    /// Whether the chat endpoint requires a bearer token
    pub require_auth: bool,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("require_auth", &self.require_auth)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SECRET_KEY` is missing or shorter than 32 bytes
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("SECRET_KEY")
            .ok_or_else(|| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("SECRET_KEY must be at least {} bytes long", MIN_SECRET_LEN);
        }

        let token_ttl_minutes: i64 = parse_or(&lookup, "TOKEN_TTL_MINUTES", 30)?;
        if token_ttl_minutes <= 0 || token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            anyhow::bail!(
                "TOKEN_TTL_MINUTES must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            );
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let api_key = lookup("ANTHROPIC_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8000)?,
                cors_origins,
                production: parse_bool_or(&lookup, "PRODUCTION", false)?,
            },
            auth: AuthConfig {
                secret,
                token_ttl_minutes,
                password_min_length: parse_or(&lookup, "PASSWORD_MIN_LENGTH", 1)?,
            },
            chat: ChatConfig {
                api_key,
                model: lookup("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: parse_or(&lookup, "CHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
                timeout_secs: parse_or(&lookup, "CHAT_TIMEOUT_SECS", 30)?,
                require_auth: parse_bool_or(&lookup, "CHAT_REQUIRE_AUTH", true)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{} must be a boolean, got {:?}", key, raw),
        },
    }
}
