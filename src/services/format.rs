//! Image format sniffing and encoding service
//!
//! Format detection works on content (magic bytes), never on the
//! client-supplied filename. The canonical output format for processed
//! images is PNG: lossless and alpha-capable, which background removal
//! requires for the transparent regions it produces.

use crate::error::{PipelineError, Result};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Container formats accepted as pipeline input
#[cfg(feature = "webp-support")]
pub const SUPPORTED_INPUT_FORMATS: &[ImageFormat] =
    &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Container formats accepted as pipeline input
#[cfg(not(feature = "webp-support"))]
pub const SUPPORTED_INPUT_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg];

/// Service for format detection and byte-level image conversion
pub struct ImageFormatService;

impl ImageFormatService {
    /// Detect the container format of raw image bytes by magic-byte sniffing
    ///
    /// # Errors
    /// - `UnsupportedFormat` when the bytes match no known container, or a
    ///   known container outside the supported input set
    pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
        let format = image::guess_format(bytes)
            .map_err(|_| PipelineError::unsupported_format("unrecognized image data"))?;

        if SUPPORTED_INPUT_FORMATS.contains(&format) {
            Ok(format)
        } else {
            Err(PipelineError::unsupported_format(format!("{format:?}")))
        }
    }

    /// Decode raw bytes into an in-memory image, returning the detected format
    ///
    /// # Errors
    /// - `UnsupportedFormat` from sniffing
    /// - `InvalidImage` when the bytes carry a supported signature but fail
    ///   to decode as that format
    pub fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
        let format = Self::sniff_format(bytes)?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| PipelineError::invalid_image(e.to_string()))?;
        Ok((image, format))
    }

    /// Serialize an image into raw bytes in the given container format
    ///
    /// JPEG has no alpha channel, so RGBA input is flattened to RGB first.
    ///
    /// # Errors
    /// - Encoder failures from the image crate
    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);

        match format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_to(&mut cursor, ImageFormat::Jpeg)?;
            },
            _ => {
                image.write_to(&mut cursor, format)?;
            },
        }
        Ok(bytes)
    }

    /// Encode an image into the canonical output format (PNG, RGBA)
    ///
    /// # Errors
    /// - PNG encoder failures from the image crate
    pub fn encode_canonical(image: &DynamicImage) -> Result<Vec<u8>> {
        let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
        let mut bytes = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Whether a format can carry an alpha channel
    pub fn supports_transparency(format: ImageFormat) -> bool {
        !matches!(format, ImageFormat::Jpeg)
    }
}
