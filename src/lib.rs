#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Replace-By-Tag Background Removal Service
//!
//! An HTTP service that accepts an uploaded image and a client-supplied
//! tag, strips the image background through an external removal service,
//! and makes the result the sole stored asset under that tag in an
//! external media storage service, returning its public URL.
//!
//! The pipeline is strictly sequential per request: validate, decode
//! (content-sniffed, never filename-trusted), invoke removal, re-encode to
//! the canonical output format (PNG with alpha), then replace the tag's
//! assets under a per-tag lock. Upload happens before old assets are
//! deleted, so a mid-sequence storage failure never leaves a tag empty.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_server::{
//!     api::{app, AppState},
//!     pipeline::ReplacePipeline,
//!     removal::HttpRemover,
//!     storage::CloudinaryStorage,
//!     config::AppConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::from_env()?;
//! let remover = Arc::new(HttpRemover::new(config.removal_endpoint.clone())?);
//! let storage = Arc::new(CloudinaryStorage::new(config.storage.clone())?);
//! let pipeline = Arc::new(ReplacePipeline::new(remover, storage));
//!
//! let router = app(AppState {
//!     pipeline,
//!     max_upload_bytes: config.max_upload_bytes,
//! });
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Both external collaborators sit behind traits
//! ([`removal::BackgroundRemover`], [`storage::MediaStorage`]) so the
//! pipeline can be exercised against in-memory fakes in tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod removal;
pub mod services;
pub mod storage;
pub mod tag_lock;
pub mod tracing_config;

// Public API exports
pub use api::{app, AppState, RemoveBgResponse};
pub use config::{AppConfig, StorageConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{ReplaceOutcome, ReplacePipeline};
pub use removal::{BackgroundRemover, HttpRemover};
pub use services::{ImageFormatService, SUPPORTED_INPUT_FORMATS};
pub use storage::{CloudinaryStorage, MediaStorage, StoredAsset};
pub use tag_lock::TagLocks;
pub use tracing_config::init_server_tracing;
