//! Replace-by-tag removal pipeline
//!
//! Consolidates the whole request-handling sequence: validate, decode,
//! remove background, re-encode canonically, then make the result the sole
//! stored asset under the request's tag. Both external collaborators come
//! in through trait objects injected at construction, so the pipeline holds
//! no global state and every step is testable against mocks.

use crate::{
    error::{PipelineError, Result},
    removal::BackgroundRemover,
    services::ImageFormatService,
    storage::MediaStorage,
    tag_lock::TagLocks,
};
use image::GenericImageView;
use std::sync::Arc;

/// Result of a successful replace-by-tag run
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    /// Public URL of the stored processed image
    pub url: String,
    /// Service-assigned id of the stored asset
    pub public_id: String,
    /// Number of prior assets removed from the tag
    pub replaced: usize,
}

/// The replace-by-tag pipeline
pub struct ReplacePipeline {
    remover: Arc<dyn BackgroundRemover>,
    storage: Arc<dyn MediaStorage>,
    tag_locks: TagLocks,
}

impl ReplacePipeline {
    /// Create a pipeline over the given removal and storage backends
    pub fn new(remover: Arc<dyn BackgroundRemover>, storage: Arc<dyn MediaStorage>) -> Self {
        Self {
            remover,
            storage,
            tag_locks: TagLocks::new(),
        }
    }

    /// Run the full pipeline for one request
    ///
    /// Steps, in order: validate inputs, sniff and decode the image,
    /// round-trip it back to bytes in its original format, call the removal
    /// backend, re-encode the output canonically (PNG with alpha), then
    /// under the tag's lock upload the new asset and delete every other
    /// asset carrying the tag.
    ///
    /// Upload happens before the deletes: a storage failure mid-sequence
    /// can leave an extra asset under the tag, but never an empty tag.
    ///
    /// # Errors
    /// - `MissingImage` / `MissingTag` on empty inputs
    /// - `UnsupportedFormat` / `InvalidImage` on undecodable uploads
    /// - `Removal` when the removal backend fails or returns garbage
    /// - `Storage` / `MissingUrl` on storage API failures
    pub async fn process(&self, image_bytes: &[u8], tag: &str) -> Result<ReplaceOutcome> {
        if tag.trim().is_empty() {
            return Err(PipelineError::MissingTag);
        }
        if image_bytes.is_empty() {
            return Err(PipelineError::MissingImage);
        }

        let (image, format) = ImageFormatService::decode(image_bytes)?;
        let (width, height) = image.dimensions();
        tracing::debug!(?format, width, height, "Decoded input image");

        // The removal backend accepts only byte buffers, so the decoded
        // image is serialized back out in its original format.
        let input_bytes = ImageFormatService::encode(&image, format)?;
        let removed_bytes = self.remover.remove(&input_bytes).await?;

        let output_image = image::load_from_memory(&removed_bytes).map_err(|e| {
            PipelineError::removal(format!("removal service returned undecodable image: {e}"))
        })?;
        let canonical = ImageFormatService::encode_canonical(&output_image)?;

        // Hold the tag's lock across the whole upload/list/delete sequence
        // so concurrent same-tag replaces serialize.
        let _guard = self.tag_locks.acquire(tag).await;

        let uploaded = self.storage.upload(canonical, tag).await?;
        tracing::info!(tag, public_id = %uploaded.public_id, "Uploaded processed image");

        let existing = self.storage.find_by_tag(tag).await?;
        let mut replaced = 0;
        for asset in existing {
            if asset.public_id == uploaded.public_id {
                continue;
            }
            self.storage.delete(&asset.public_id).await?;
            tracing::debug!(tag, public_id = %asset.public_id, "Deleted replaced asset");
            replaced += 1;
        }

        Ok(ReplaceOutcome {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            replaced,
        })
    }
}
