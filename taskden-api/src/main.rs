//! # Taskden API Server
//!
//! Multi-user todo service with bearer-token auth and a stateless chat relay.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Signup and form-based login issuing 30 minute HS256 tokens
//! - Owner-scoped todo CRUD with completion toggling, filters and stats
//! - A chat relay to the Anthropic Messages API
//!
//! All state is in memory and starts empty on every launch.
//!
//! ## Usage
//!
//! ```bash
//! SECRET_KEY=$(openssl rand -hex 32) cargo run -p taskden-api
//! ```

use taskden_api::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskden_api=debug,taskden_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskden API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
