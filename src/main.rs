mod app;
mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;

use anyhow::Context;
use tower_sessions::cookie::Key;
use tracing_subscriber::EnvFilter;
use crate::{
    app::AppState,
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().context("Failed to load configuration")?;

    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", config.storage.data_dir))?;

    let state = AppState::open(&config)
        .await
        .context("Failed to load data files")?;
    tracing::info!(
        "Loaded {} users and {} tasks from {}",
        state.credentials.len().await,
        state.tasks.list_all().await.len(),
        config.storage.data_dir
    );

    // Generated per process: restarting the server logs everyone out
    let key = Key::generate();
    let app = app::build_router(state, &config, key);

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", config.server.host, config.server.port)
    )
    .await
    .context("Failed to bind server")?;
    tracing::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
