//! OCR (Optical Character Recognition) Module
//!
//! Everything between raw upload bytes and recognized text.
//!
//! # Architecture
//!
//! - [`ImageDecoder`] validates untrusted bytes into a [`DecodedImage`]
//!   (supported raster format, non-zero size, within the pixel budget).
//!   It has no shared state and runs in parallel.
//! - [`RecognitionModel`] is the seam for a loaded model backend;
//!   `TesseractModel` implements it via leptess.
//! - [`InferenceEngine`] owns the single model instance for the life of the
//!   process, tracks its lifecycle (`Uninitialized -> Initializing -> Ready`)
//!   and serializes every `recognize` call behind one mutex.
//!
//! # Configuration
//!
//! Backend selection and tesseract settings come from `OcrConfig`
//! (see `config.rs`):
//! - `model`: backend selector, currently `local/tesseract`
//! - `languages`: tesseract language set, e.g. `jpn_vert+jpn`
//! - `data_path`: tesseract data directory, system default when unset
//! - `max_image_dimension`: images are downscaled to this before recognition
//! - `max_image_pixels`: decoder rejects anything larger
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = InferenceEngine::load(&config.ocr)?;
//! let image = ImageDecoder::new(&config.ocr).decode(&bytes)?;
//! let text = engine.recognize(image).await?;
//! ```
//!
//! [`DecodedImage`]: crate::models::DecodedImage

mod decoder;
mod engine;
mod model;
mod tesseract;

pub use decoder::{decode, sniff_media_type, DecodeError, ImageDecoder};
pub use engine::{EngineState, InferenceEngine};
pub use model::{load_model, InferenceError, RecognitionModel};
pub use tesseract::TesseractModel;
