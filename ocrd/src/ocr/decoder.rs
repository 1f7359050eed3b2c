use std::io::{Cursor, ErrorKind};

use image::{ImageError, ImageReader, Limits};
use thiserror::Error;

use crate::config::OcrConfig;
use crate::models::DecodedImage;

/// Why a byte sequence could not become a [`DecodedImage`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("truncated image data")]
    Truncated,

    #[error("corrupt image: {0}")]
    Corrupt(String),

    #[error("image has zero size: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("image too large: {0}")]
    TooLarge(String),
}

/// Validation boundary between untrusted uploads and the inference engine.
///
/// Stateless apart from its limits, so one instance is cloned freely into
/// blocking tasks and decodes run fully in parallel.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_pixels: u64,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

impl ImageDecoder {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            max_pixels: config.max_image_pixels,
        }
    }

    /// Parse `bytes` as a supported raster image with non-zero dimensions.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Corrupt(format!("Failed to read image: {e}")))?;

        let Some(format) = reader.format() else {
            return Err(DecodeError::UnsupportedFormat(sniff_media_type(bytes)));
        };

        // Budget is checked on header dimensions so pixel depth does not matter.
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(map_image_error)?;
        if width == 0 || height == 0 {
            return Err(DecodeError::ZeroSize { width, height });
        }
        if u64::from(width) * u64::from(height) > self.max_pixels {
            return Err(DecodeError::TooLarge(format!(
                "{width}x{height} exceeds {} pixels",
                self.max_pixels
            )));
        }

        let mut limits = Limits::default();
        // Rgba32F is the widest decoded layout, 16 bytes per pixel.
        limits.max_alloc = Some(self.max_pixels.saturating_mul(16));
        reader.limits(limits);

        let img = reader.decode().map_err(map_image_error)?;

        Ok(DecodedImage::new(img, format))
    }
}

/// Decode with default limits.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    ImageDecoder::default().decode(bytes)
}

/// Best-effort media type of `bytes`, `"unknown"` when nothing matches.
pub fn sniff_media_type(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        ImageError::Limits(e) => DecodeError::TooLarge(e.to_string()),
        ImageError::IoError(e) if e.kind() == ErrorKind::UnexpectedEof => DecodeError::Truncated,
        ImageError::Decoding(e) => {
            let message = e.to_string();
            if looks_truncated(&message) {
                DecodeError::Truncated
            } else {
                DecodeError::Corrupt(message)
            }
        }
        ImageError::Parameter(e) => DecodeError::Corrupt(e.to_string()),
        other => DecodeError::Corrupt(other.to_string()),
    }
}

fn looks_truncated(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("unexpected end") || lower.contains("eof") || lower.contains("truncated")
}
