use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use crate::{config::Config, upstream::Client};

mod dto;
mod handlers;

pub use handlers::build_router;

/// State shared by every handler. Immutable after startup.
pub struct AppState {
    pub client: Client,
    pub max_message_length: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(config),
            max_message_length: config.max_message_length,
        }
    }
}

pub fn app(config: &Config) -> Router {
    let state = Arc::new(AppState::new(config));
    build_router(state, &config.chat_path)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let router = app(&config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        model = &*config.model,
        upstream = &*config.upstream_url,
        "Starting server on {}{}",
        addr,
        config.chat_path
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, shutting down"),
        Err(error) => {
            tracing::error!("Failed to install Ctrl-C handler: {}", error);
            std::future::pending::<()>().await
        }
    }
}
