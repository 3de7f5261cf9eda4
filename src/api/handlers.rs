//! Request handlers
//!
//! `POST /remove-bg` accepts a multipart form with an `image` file field
//! and a `tag` text field, runs the replace pipeline, and answers with the
//! public URL of the stored result.

use super::AppState;
use crate::error::{PipelineError, Result};
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body for successful replace requests
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveBgResponse {
    pub success: bool,
    pub message: String,
    pub image_url: String,
}

/// JSON body for the health probe
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Handle `POST /remove-bg`
///
/// Validation order matches the documented failure modes: missing image,
/// missing tag, empty filename, then content-level checks inside the
/// pipeline. Field order within the form does not matter.
pub(crate) async fn remove_bg(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RemoveBgResponse>> {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut tag: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::malformed_request(format!("bad multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "image" => {
                filename = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    PipelineError::malformed_request(format!("failed to read image field: {e}"))
                })?;
                image_bytes = Some(bytes.to_vec());
            },
            "tag" => {
                let value = field.text().await.map_err(|e| {
                    PipelineError::malformed_request(format!("failed to read tag field: {e}"))
                })?;
                tag = Some(value);
            },
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            },
        }
    }

    let image_bytes = image_bytes.ok_or(PipelineError::MissingImage)?;
    let tag = tag.ok_or(PipelineError::MissingTag)?;
    if matches!(filename.as_deref(), Some("")) {
        return Err(PipelineError::EmptyFilename);
    }

    let outcome = state.pipeline.process(&image_bytes, &tag).await?;
    tracing::info!(
        tag,
        public_id = %outcome.public_id,
        replaced = outcome.replaced,
        "Replace-by-tag request complete"
    );

    Ok(Json(RemoveBgResponse {
        success: true,
        message: "Background removed successfully.".to_string(),
        image_url: outcome.url,
    }))
}
