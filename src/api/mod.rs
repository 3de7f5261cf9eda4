//! HTTP surface for the replace-by-tag service

mod handlers;

pub use handlers::{HealthResponse, RemoveBgResponse};

use crate::pipeline::ReplacePipeline;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// The request pipeline, constructed once at startup
    pub pipeline: Arc<ReplacePipeline>,
    /// Request body admission limit in bytes
    pub max_upload_bytes: usize,
}

/// Build the service router
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/remove-bg", post(handlers::remove_bg))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
