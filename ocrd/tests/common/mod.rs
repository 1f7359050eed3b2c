#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Once};
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use ocrd::config::{BatchConfig, Config, OcrConfig, ServerConfig};
use ocrd::models::DecodedImage;
use ocrd::ocr::{InferenceEngine, InferenceError, RecognitionModel};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Images this wide are refused by [`DimensionsModel`].
pub const REJECTED_WIDTH: u32 = 13;

/// Encode a blank RGB image of the given size as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    output
}

/// Answers with the image dimensions, e.g. `"40x20"`, so tests can tell
/// which input produced which result.
pub struct DimensionsModel;

impl RecognitionModel for DimensionsModel {
    fn name(&self) -> &str {
        "test/dimensions"
    }

    fn recognize(&mut self, image: &DecodedImage) -> Result<String, InferenceError> {
        if image.width() == REJECTED_WIDTH {
            return Err(InferenceError::Rejected(format!(
                "unsupported width {}",
                image.width()
            )));
        }
        Ok(format!("{}x{}", image.width(), image.height()))
    }
}

/// [`DimensionsModel`] that sleeps before every answer.
pub struct SlowModel {
    pub delay: Duration,
}

impl RecognitionModel for SlowModel {
    fn name(&self) -> &str {
        "test/slow"
    }

    fn recognize(&mut self, image: &DecodedImage) -> Result<String, InferenceError> {
        std::thread::sleep(self.delay);
        DimensionsModel.recognize(image)
    }
}

pub fn ready_engine<M: RecognitionModel>(model: M) -> Arc<InferenceEngine> {
    let engine = InferenceEngine::new();
    engine
        .initialize(move || Ok(Box::new(model)))
        .expect("test engine should initialize");
    Arc::new(engine)
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes: 4 * 1024 * 1024,
        },
        ocr: OcrConfig::default(),
        batch: BatchConfig {
            max_items: 8,
            concurrency: 4,
            timeout_secs: 30,
        },
    }
}

pub const BOUNDARY: &str = "ocrd-test-boundary";

/// One multipart part: `(field name, filename, bytes)`.
pub type Part<'a> = (&'a str, &'a str, &'a [u8]);

/// Build a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
