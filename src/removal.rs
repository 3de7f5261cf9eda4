//! Background-removal backend abstraction
//!
//! The model itself is an external collaborator: raw image bytes go in,
//! image bytes with transparent background come out. Everything behind the
//! trait is opaque to the pipeline.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Trait for background-removal backends
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Remove the background from an encoded image
    ///
    /// Accepts raw bytes in any supported container format and returns raw
    /// bytes of the same subject with non-subject pixels made transparent.
    /// Single attempt, no retry.
    ///
    /// # Errors
    /// - Transport failures reaching the removal service
    /// - Non-success responses from the removal service
    async fn remove(&self, image_bytes: &[u8]) -> Result<Vec<u8>>;
}

/// HTTP client for a hosted background-removal service
///
/// Posts the image bytes as the request body and reads the processed image
/// back from the response body.
pub struct HttpRemover {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRemover {
    /// Default per-request timeout for removal calls
    ///
    /// Model inference on large images is slow; this bounds a hung upstream
    /// rather than typical latency.
    pub const TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a new remover targeting the given endpoint URL
    ///
    /// # Errors
    /// - HTTP client construction failures
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| PipelineError::removal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for HttpRemover {
    async fn remove(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        tracing::debug!(
            endpoint = %self.endpoint,
            input_bytes = image_bytes.len(),
            "Invoking background-removal service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image_bytes.to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::removal(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::removal(format!(
                "removal service returned HTTP {status}: {detail}"
            )));
        }

        let output = response
            .bytes()
            .await
            .map_err(|e| PipelineError::removal(e.to_string()))?;

        tracing::debug!(output_bytes = output.len(), "Background removal complete");
        Ok(output.to_vec())
    }
}
