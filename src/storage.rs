//! Media storage backend abstraction and Cloudinary client
//!
//! The storage service owns persistence and serving; this module only
//! issues the three calls the pipeline needs (list-by-tag, delete-by-id,
//! upload-with-tag). Credentials are injected at construction, never held
//! as process-global state.

use crate::config::StorageConfig;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// A stored asset as known by the external media service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Service-assigned opaque identifier
    pub public_id: String,
    /// Public retrieval URL
    pub secure_url: String,
}

/// Trait for media storage backends
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// List all assets currently associated with a tag
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<StoredAsset>>;

    /// Delete an asset by its service-assigned id
    async fn delete(&self, public_id: &str) -> Result<()>;

    /// Upload image bytes as a new asset carrying the given tag
    async fn upload(&self, bytes: Vec<u8>, tag: &str) -> Result<StoredAsset>;
}

/// Cloudinary REST API base URL
const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Timeout for storage API calls
const STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Page size for tag listings; `find_by_tag` follows the cursor until the
/// listing is exhausted
const LIST_PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    public_id: String,
    #[serde(default)]
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary-backed media storage client
pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: StorageConfig,
    api_base: String,
}

impl CloudinaryStorage {
    /// Create a new storage client from credentials
    ///
    /// # Errors
    /// - HTTP client construction failures
    pub fn new(config: StorageConfig) -> Result<Self> {
        Self::with_api_base(config, DEFAULT_API_BASE)
    }

    /// Create a client against a non-default API base (test servers)
    ///
    /// # Errors
    /// - HTTP client construction failures
    pub fn with_api_base(config: StorageConfig, api_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(STORAGE_TIMEOUT)
            .build()
            .map_err(|e| PipelineError::storage(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_base: api_base.into(),
        })
    }

    fn resource_url(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.api_base, self.config.cloud_name)
    }

    /// Build the listing URL with the tag as a single percent-encoded path
    /// segment
    ///
    /// Tags are opaque strings; reserved URL characters (`/`, `?`, `#`, `%`)
    /// must not leak into extra path segments or a query string.
    fn tag_listing_url(&self, tag: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| PipelineError::storage(format!("invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PipelineError::storage("API base URL cannot be a base"))?
            .push(&self.config.cloud_name)
            .extend(["resources", "image", "tags"])
            .push(tag);
        Ok(url)
    }

    /// Compute the SHA-256 request signature over the given parameters
    ///
    /// Parameters are serialized in alphabetical order as `key=value` pairs
    /// joined by `&`, with the API secret appended, per the storage
    /// service's signed-request scheme.
    fn sign_request(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);

        let serialized = sorted
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        hasher.update(api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

#[async_trait]
impl MediaStorage for CloudinaryStorage {
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<StoredAsset>> {
        let url = self.tag_listing_url(tag)?;

        let mut assets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(url.clone())
                .query(&[("max_results", LIST_PAGE_SIZE)])
                .basic_auth(&self.config.api_key, Some(&self.config.api_secret));
            if let Some(next_cursor) = &cursor {
                request = request.query(&[("next_cursor", next_cursor)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| PipelineError::storage(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(PipelineError::storage(format!(
                    "list by tag returned HTTP {status}: {detail}"
                )));
            }

            let ListResponse {
                resources,
                next_cursor,
            } = response
                .json()
                .await
                .map_err(|e| PipelineError::storage(format!("malformed list response: {e}")))?;

            assets.extend(resources.into_iter().map(|entry| StoredAsset {
                public_id: entry.public_id,
                secure_url: entry.secure_url,
            }));

            match next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(assets)
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let url = self.resource_url("image/destroy");
        let timestamp = Self::timestamp();
        let signature = Self::sign_request(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let form = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| PipelineError::storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::storage(format!(
                "destroy returned HTTP {status}: {detail}"
            )));
        }

        let outcome: DestroyResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::storage(format!("malformed destroy response: {e}")))?;

        // "not found" means another replace already removed it; the slot is
        // clean either way.
        match outcome.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(PipelineError::storage(format!(
                "destroy of {public_id} returned result '{other}'"
            ))),
        }
    }

    async fn upload(&self, bytes: Vec<u8>, tag: &str) -> Result<StoredAsset> {
        let url = self.resource_url("image/upload");
        let timestamp = Self::timestamp();
        let signature = Self::sign_request(
            &[("tags", tag), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name("processed.png")
            .mime_str("image/png")
            .map_err(|e| PipelineError::storage(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("tags", tag.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::storage(format!(
                "upload returned HTTP {status}: {detail}"
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::storage(format!("malformed upload response: {e}")))?;

        let secure_url = uploaded.secure_url.ok_or(PipelineError::MissingUrl)?;

        Ok(StoredAsset {
            public_id: uploaded.public_id,
            secure_url,
        })
    }
}
