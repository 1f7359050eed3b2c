use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use leptess::LepTess;

use crate::config::OcrConfig;
use crate::models::DecodedImage;

use super::model::{InferenceError, RecognitionModel};

/// Local tesseract backend via leptess.
pub struct TesseractModel {
    tesseract: LepTess,
    max_dimension: u32,
}

impl TesseractModel {
    pub fn load(config: &OcrConfig) -> Result<Self, InferenceError> {
        let tesseract = LepTess::new(config.data_path.as_deref(), &config.languages)
            .map_err(|e| InferenceError::Load(format!("Tesseract not available: {e}")))?;

        Ok(Self {
            tesseract,
            max_dimension: config.max_image_dimension,
        })
    }
}

impl RecognitionModel for TesseractModel {
    fn name(&self) -> &str {
        "local/tesseract"
    }

    fn recognize(&mut self, image: &DecodedImage) -> Result<String, InferenceError> {
        let png = prepare_for_tesseract(image.as_image(), self.max_dimension)?;

        self.tesseract
            .set_image_from_mem(&png)
            .map_err(|e| InferenceError::Rejected(format!("Failed to set image: {e}")))?;

        let text = self
            .tesseract
            .get_utf8_text()
            .map_err(|e| InferenceError::Backend(format!("Failed to extract text: {e}")))?;

        Ok(text.trim().to_string())
    }
}

/// Grayscale PNG bytes, downscaled so neither side exceeds `max_dim`.
///
/// Works on a copy; the caller's image is left untouched.
fn prepare_for_tesseract(img: &DynamicImage, max_dim: u32) -> Result<Vec<u8>, InferenceError> {
    let gray = DynamicImage::ImageLuma8(resize_if_needed(img, max_dim).to_luma8());

    let mut output = Vec::new();
    gray.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| InferenceError::Rejected(format!("Failed to encode image: {e}")))?;

    Ok(output)
}

/// Lanczos3 downscale preserving aspect ratio; returns a clone when no resize is needed.
fn resize_if_needed(img: &DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if width <= max_dim && height <= max_dim {
        return img.clone();
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}
