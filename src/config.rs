//! Startup configuration for the replace-by-tag service
//!
//! All credentials and endpoints are read once at startup; absence of a
//! required value fails the boot instead of surfacing per-request.

use crate::error::{PipelineError, Result};
use std::net::SocketAddr;

/// Default bind address for the HTTP server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default request body limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Credentials for the external media storage service
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Account/cloud identifier
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret, used for request signing
    pub api_secret: String,
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Media storage credentials
    pub storage: StorageConfig,
    /// URL of the background-removal service
    pub removal_endpoint: String,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    /// - Missing `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`,
    ///   `CLOUDINARY_API_SECRET`, or `REMOVAL_ENDPOINT`
    /// - Unparseable `BIND_ADDR` or `MAX_UPLOAD_BYTES`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// The indirection keeps the parsing logic testable without mutating
    /// process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PipelineError::invalid_config(format!("{key} is not set")))
        };

        let storage = StorageConfig {
            cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            api_key: require("CLOUDINARY_API_KEY")?,
            api_secret: require("CLOUDINARY_API_SECRET")?,
        };

        let removal_endpoint = require("REMOVAL_ENDPOINT")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| PipelineError::invalid_config(format!("BIND_ADDR: {e}")))?;

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| PipelineError::invalid_config(format!("MAX_UPLOAD_BYTES: {e}")))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let config = Self {
            storage,
            removal_endpoint,
            bind_addr,
            max_upload_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter ranges and endpoint shape
    ///
    /// # Errors
    /// - Zero body limit
    /// - Removal endpoint without an http(s) scheme
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(PipelineError::invalid_config(
                "MAX_UPLOAD_BYTES must be greater than zero",
            ));
        }
        if !self.removal_endpoint.starts_with("http://")
            && !self.removal_endpoint.starts_with("https://")
        {
            return Err(PipelineError::invalid_config(
                "REMOVAL_ENDPOINT must be an http(s) URL",
            ));
        }
        Ok(())
    }
}
