use serde::Deserialize;
use std::env;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a whole request body, multipart overhead included.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Backend selector, `provider/model` (e.g. `local/tesseract`).
    pub model: String,
    pub languages: String,
    pub data_path: Option<String>,
    pub max_image_dimension: u32,
    pub max_image_pixels: u64,
}

/// Limits applied by the request orchestrator to a single batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub max_items: usize,
    pub concurrency: usize,
    /// `0` disables the deadline.
    pub timeout_secs: u64,
}

impl BatchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            languages: "jpn_vert+jpn".to_string(),
            data_path: None,
            max_image_dimension: 4096,
            max_image_pixels: 100_000_000,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_items: 64,
            concurrency: 4,
            timeout_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr_defaults = OcrConfig::default();
        let batch_defaults = BatchConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("OCRD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("OCRD_PORT", 8000),
                max_upload_bytes: parse_env_or("OCRD_MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or(ocr_defaults.model),
                languages: env::var("OCR_LANGUAGES").unwrap_or(ocr_defaults.languages),
                data_path: env::var("OCR_DATA_PATH").ok().filter(|p| !p.is_empty()),
                max_image_dimension: parse_env_or(
                    "OCR_MAX_DIMENSION",
                    ocr_defaults.max_image_dimension,
                ),
                max_image_pixels: parse_env_or("OCR_MAX_PIXELS", ocr_defaults.max_image_pixels),
            },
            batch: BatchConfig {
                max_items: parse_env_or("BATCH_MAX_ITEMS", batch_defaults.max_items),
                concurrency: parse_env_or("BATCH_CONCURRENCY", batch_defaults.concurrency).max(1),
                timeout_secs: parse_env_or("BATCH_TIMEOUT_SECS", batch_defaults.timeout_secs),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Split an OCR model selector into `(provider, model)`.
///
/// A selector without a `/` is treated as a local model name.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    match model.split_once('/') {
        Some((prefix, rest)) => (prefix, rest),
        None => ("local", model),
    }
}
