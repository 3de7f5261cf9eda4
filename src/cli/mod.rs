//! Command-line entry point for the replace-by-tag server

use crate::{
    api::{app, AppState},
    config::AppConfig,
    pipeline::ReplacePipeline,
    removal::HttpRemover,
    storage::CloudinaryStorage,
    tracing_config::init_server_tracing,
};
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

/// Background-removal upload server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-server")]
pub struct Cli {
    /// Bind address (overrides BIND_ADDR)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Parse arguments, load configuration, and serve until shutdown
///
/// # Errors
/// - Missing or invalid configuration
/// - Bind or serve failures
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_server_tracing(cli.verbose)?;

    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let remover = Arc::new(HttpRemover::new(config.removal_endpoint.clone())?);
    let storage = Arc::new(CloudinaryStorage::new(config.storage.clone())?);
    let pipeline = Arc::new(ReplacePipeline::new(remover, storage));

    let state = AppState {
        pipeline,
        max_upload_bytes: config.max_upload_bytes,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}
