//! Error types for the replace-by-tag removal pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error taxonomy for the request pipeline
///
/// Each step of the pipeline fails with a distinct variant so callers and
/// logs can tell a client mistake from a removal failure from a storage
/// failure. Client input errors map to HTTP 400 and are reported verbatim;
/// upstream failures map to HTTP 500 with a sanitized message (full detail
/// goes to the logs, not the wire).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The multipart request carried no image file
    #[error("No image file provided")]
    MissingImage,

    /// The multipart request carried no tag field
    #[error("No tag provided")]
    MissingTag,

    /// The image field was present but had an empty filename
    #[error("No selected file")]
    EmptyFilename,

    /// The multipart body itself could not be read
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The uploaded bytes are not in a supported container format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The bytes claimed a supported format but did not decode
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The background-removal call failed
    #[error("Background removal failed: {0}")]
    Removal(String),

    /// A storage list/delete/upload call failed
    #[error("Storage operation failed: {0}")]
    Storage(String),

    /// Upload succeeded but the storage response carried no URL
    #[error("Storage response missing asset URL")]
    MissingUrl,

    /// Image re-encoding errors (our side, after a successful decode)
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid configuration, surfaced at startup only
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new invalid image error
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new malformed request error
    pub fn malformed_request<S: Into<String>>(msg: S) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create a new removal error
    pub fn removal<S: Into<String>>(msg: S) -> Self {
        Self::Removal(msg.into())
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingImage
            | Self::MissingTag
            | Self::EmptyFilename
            | Self::MalformedRequest(_)
            | Self::UnsupportedFormat(_)
            | Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
            Self::Removal(_)
            | Self::Storage(_)
            | Self::MissingUrl
            | Self::Image(_)
            | Self::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-safe message, without leaking upstream error detail
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingImage
            | Self::MissingTag
            | Self::EmptyFilename
            | Self::MalformedRequest(_)
            | Self::UnsupportedFormat(_)
            | Self::InvalidImage(_) => self.to_string(),
            Self::Removal(_) => "Background removal failed".to_string(),
            Self::Storage(_) | Self::MissingUrl => "Storage operation failed".to_string(),
            Self::Image(_) | Self::InvalidConfig(_) => "Internal server error".to_string(),
        }
    }
}

/// JSON body for failed requests
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match &self {
            Self::Removal(_) | Self::Storage(_) | Self::MissingUrl | Self::Image(_) | Self::InvalidConfig(_) => {
                tracing::error!("Pipeline failure: {}", self);
            },
            _ => {
                tracing::debug!("Client error: {}", self);
            },
        }

        let body = ErrorBody {
            success: false,
            message: self.user_message(),
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}
