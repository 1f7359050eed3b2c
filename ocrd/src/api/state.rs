use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{ImageDecoder, InferenceEngine};
use crate::services::RecognitionService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The one engine instance for this process, already initialized by `main`.
    pub engine: Arc<InferenceEngine>,
    pub recognition: RecognitionService,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<InferenceEngine>) -> Self {
        let decoder = ImageDecoder::new(&config.ocr);
        let recognition = RecognitionService::new(Arc::clone(&engine), decoder, &config.batch);

        Self {
            config: Arc::new(config),
            engine,
            recognition,
        }
    }
}
