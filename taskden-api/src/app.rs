/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskden_api::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::from_config(config)?;
/// let app = taskden_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_auth, security::security_headers},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use taskden_shared::{
    auth::{gateway::AuthGateway, jwt::HmacTokenSigner, password::Argon2Hasher},
    chat::{
        anthropic::{AnthropicConfig, AnthropicProvider},
        ChatRelay, CompletionProvider,
    },
    models::{CredentialStore, TodoStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference-counted, so clones share the same stores.
#[derive(Clone)]
pub struct AppState {
    /// Signup, login and token resolution
    pub auth: AuthGateway,

    /// Ownership-scoped todo store
    pub todos: Arc<TodoStore>,

    /// Chat relay (possibly without a provider)
    pub chat: ChatRelay,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Assembles state from already-built components
    pub fn new(config: Config, auth: AuthGateway, chat: ChatRelay) -> Self {
        Self {
            auth,
            todos: Arc::new(TodoStore::new()),
            chat,
            config: Arc::new(config),
        }
    }

    /// Builds the production components described by `config`
    ///
    /// # Errors
    ///
    /// Fails if the password hasher or the completion provider cannot be
    /// constructed. A missing provider key is not an error; chat is simply
    /// disabled.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let signer = HmacTokenSigner::with_ttl(
            &config.auth.secret,
            chrono::Duration::minutes(config.auth.token_ttl_minutes),
        );
        let auth = AuthGateway::new(
            Arc::new(CredentialStore::new()),
            Arc::new(Argon2Hasher::new()?),
            Arc::new(signer),
        )
        .with_min_password_length(config.auth.password_min_length);

        let timeout = Duration::from_secs(config.chat.timeout_secs);
        let provider: Option<Arc<dyn CompletionProvider>> = match &config.chat.api_key {
            Some(key) => {
                let provider = AnthropicProvider::new(AnthropicConfig {
                    api_key: key.clone(),
                    model: config.chat.model.clone(),
                    max_tokens: config.chat.max_tokens,
                    timeout,
                })?;
                tracing::info!(model = %provider.model(), "chat provider configured");
                Some(Arc::new(provider) as Arc<dyn CompletionProvider>)
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY not set, chat endpoint disabled");
                None
            }
        };

        Ok(Self::new(config, auth, ChatRelay::new(provider, timeout)))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                        # Health check (public)
/// ├── GET  /api                           # Banner (public)
/// ├── /auth/                              # Authentication (public)
/// │   ├── POST /signup
/// │   └── POST /login                     # form-encoded username/password
/// ├── GET  /api/profile                   # Caller identity (bearer)
/// ├── /api/todos/                         # Todos (bearer, owner-scoped)
/// │   ├── POST   /
/// │   ├── GET    /                        # ?status=&search=
/// │   ├── GET    /stats
/// │   ├── GET    /:id
/// │   ├── PUT    /:id
/// │   ├── DELETE /:id
/// │   └── PATCH  /:id/complete
/// └── POST /chat (alias /api/chat)        # Chat relay (bearer unless disabled)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_layer = || axum::middleware::from_fn_with_state(state.clone(), require_auth);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api", get(routes::health::banner));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    let profile_routes = Router::new()
        .route("/api/profile", get(routes::auth::profile))
        .layer(auth_layer());

    let todo_routes = Router::new()
        .route(
            "/",
            post(routes::todos::create_todo).get(routes::todos::list_todos),
        )
        .route("/stats", get(routes::todos::todo_stats))
        .route(
            "/:id",
            get(routes::todos::get_todo)
                .put(routes::todos::update_todo)
                .delete(routes::todos::delete_todo),
        )
        .route("/:id/complete", patch(routes::todos::toggle_todo))
        .layer(auth_layer());

    let mut chat_routes = Router::new()
        .route("/chat", post(routes::chat::chat))
        .route("/api/chat", post(routes::chat::chat));
    if state.config.chat.require_auth {
        chat_routes = chat_routes.layer(auth_layer());
    }

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .nest("/auth", auth_routes)
        .merge(profile_routes)
        .nest("/api/todos", todo_routes)
        .merge(chat_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(production, security_headers))
        .with_state(state)
}
