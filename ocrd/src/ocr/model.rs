use thiserror::Error;
use tracing::info;

use crate::config::{parse_provider_model, OcrConfig};
use crate::models::DecodedImage;

use super::tesseract::TesseractModel;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The model refused a structurally valid image (shape, pixel layout).
    #[error("model rejected image: {0}")]
    Rejected(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("recognition task panicked: {0}")]
    Panicked(String),

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("unknown OCR model '{0}'")]
    UnknownModel(String),
}

/// A loaded recognition model.
///
/// `recognize` takes `&mut self` because real backends (tesseract among them)
/// keep per-call scratch state. Implementations are not assumed to be `Sync`;
/// [`super::InferenceEngine`] owns exactly one and serializes access to it.
pub trait RecognitionModel: Send + 'static {
    fn name(&self) -> &str;

    fn recognize(&mut self, image: &DecodedImage) -> Result<String, InferenceError>;
}

/// Load the backend named by `config.model`.
pub fn load_model(config: &OcrConfig) -> Result<Box<dyn RecognitionModel>, InferenceError> {
    let (provider, model) = parse_provider_model(&config.model);

    match (provider.to_lowercase().as_str(), model.to_lowercase().as_str()) {
        ("local", "tesseract") => {
            let model = TesseractModel::load(config)?;
            info!(languages = %config.languages, "Tesseract OCR initialized");
            Ok(Box::new(model))
        }
        _ => Err(InferenceError::UnknownModel(config.model.clone())),
    }
}
