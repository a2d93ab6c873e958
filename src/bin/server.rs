//! roleplay-relay HTTP server binary.
//!
//! Starts an axum HTTP server exposing the health check and the chat
//! endpoint. Configuration is read once from the environment (and an
//! optional `.env` file); see [`roleplay_relay::config`] for the variables.
//!
//! # Usage
//!
//! ```bash
//! GOOGLE_API_KEY=... cargo run --bin server
//! ```

use anyhow::Context;
use roleplay_relay::config::RelayConfig;
use roleplay_relay::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roleplay_relay=debug".into()),
        )
        .init();

    match &config.dotenv_path {
        Some(path) => tracing::info!("Loaded environment from {}", path.display()),
        None => tracing::info!("No .env file found, using process environment"),
    }
    tracing::info!("API key visible to process: {}", config.has_api_key());
    if !config.has_api_key() {
        tracing::warn!("GOOGLE_API_KEY is not set; chat turns will reply with an error");
    }
    tracing::info!(
        model = %config.model,
        scenarios = %config.scenarios_dir.display(),
        prompts = %config.prompts_dir.display(),
        "relay configuration"
    );

    let state = AppState::new(config.build_orchestrator());
    let app = app_router(state);

    let bind_addr = config.bind_addr();
    tracing::info!(
        "roleplay-relay v{} server starting on {}",
        roleplay_relay::VERSION,
        bind_addr
    );
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /    : health message");
    tracing::info!("  POST /chat: role-play chat turn");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
