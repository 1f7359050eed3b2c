use image::{DynamicImage, GenericImageView, ImageFormat};

/// One uploaded image as received by the transport shell.
///
/// `filename` and `content_type` are whatever the client declared. Nothing
/// downstream trusts them; the decoder sniffs the real format from `bytes`.
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl RawInput {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A validated raster image with non-zero dimensions.
///
/// Only [`crate::ocr::ImageDecoder`] constructs these, so holding one is proof
/// the bytes parsed.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: ImageFormat,
}

impl DecodedImage {
    pub(crate) fn new(image: DynamicImage, format: ImageFormat) -> Self {
        debug_assert!(image.width() > 0 && image.height() > 0);
        Self { image, format }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Format detected from the byte stream, not the declared content type.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }
}
