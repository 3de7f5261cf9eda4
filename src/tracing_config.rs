//! Tracing initialization for the server binary
//!
//! `RUST_LOG` takes precedence when set; otherwise the CLI verbosity flag
//! picks the level. Library users are expected to install their own
//! subscriber.

use crate::error::{PipelineError, Result};
use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a default filter directive
fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber
///
/// # Errors
/// - A subscriber was already installed
pub fn init_server_tracing(verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| PipelineError::invalid_config(format!("failed to init tracing: {e}")))?;

    tracing::debug!(verbose, "Tracing initialized");
    Ok(())
}
