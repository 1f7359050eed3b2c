use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::error::{OcrdError, Result};
use crate::models::{DecodedImage, RecognitionError};

use super::model::{load_model, InferenceError, RecognitionModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
}

impl EngineState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            STATE_INITIALIZING => Self::Initializing,
            STATE_READY => Self::Ready,
            _ => Self::Uninitialized,
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

const STATE_UNINITIALIZED: u8 = 0;
const STATE_INITIALIZING: u8 = 1;
const STATE_READY: u8 = 2;

struct LoadedModel {
    name: String,
    model: Arc<Mutex<Box<dyn RecognitionModel>>>,
}

/// Process-lifetime owner of the recognition model.
///
/// Constructed once at startup and shared by `Arc`; state only moves forward
/// (`Uninitialized -> Initializing -> Ready`) except that a failed load drops
/// back to `Uninitialized`. Every `recognize` call goes through one mutex:
/// the model is not assumed safe for parallel invocation, so this lock is the
/// service's contention point and waits on it are logged as `lock_wait_ms`.
pub struct InferenceEngine {
    state: AtomicU8,
    loaded: OnceLock<LoadedModel>,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNINITIALIZED),
            loaded: OnceLock::new(),
        }
    }

    /// Build and initialize an engine from configuration, blocking until the
    /// model is loaded.
    pub fn load(config: &OcrConfig) -> Result<Self> {
        let engine = Self::new();
        engine.initialize(|| load_model(config))?;
        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    pub fn model_name(&self) -> Option<&str> {
        self.loaded.get().map(|loaded| loaded.name.as_str())
    }

    /// Run `loader` once and move the engine to `Ready`.
    ///
    /// Fails without calling `loader` when the engine is already initializing
    /// or ready.
    pub fn initialize<F>(&self, loader: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<Box<dyn RecognitionModel>, InferenceError>,
    {
        if let Err(current) = self.state.compare_exchange(
            STATE_UNINITIALIZED,
            STATE_INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(OcrdError::EngineInit(format!(
                "engine is already {}",
                EngineState::from_u8(current)
            )));
        }

        let started = Instant::now();
        let model = match loader() {
            Ok(model) => model,
            Err(e) => {
                self.state.store(STATE_UNINITIALIZED, Ordering::Release);
                warn!(error = %e, "Inference engine failed to initialize");
                return Err(OcrdError::EngineInit(e.to_string()));
            }
        };

        let name = model.name().to_string();
        let loaded = LoadedModel {
            name: name.clone(),
            model: Arc::new(Mutex::new(model)),
        };
        if self.loaded.set(loaded).is_err() {
            // Unreachable while the CAS above guards entry.
            return Err(OcrdError::EngineInit("model already loaded".to_string()));
        }
        self.state.store(STATE_READY, Ordering::Release);

        info!(
            model = %name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Inference engine ready"
        );
        Ok(())
    }

    /// Recognize text in `image`.
    ///
    /// Returns [`RecognitionError::EngineNotReady`] immediately, without
    /// waiting, if initialization has not completed.
    pub async fn recognize(
        &self,
        image: DecodedImage,
    ) -> std::result::Result<String, RecognitionError> {
        let loaded = match self.loaded.get() {
            Some(loaded) if self.is_ready() => loaded,
            _ => return Err(RecognitionError::EngineNotReady),
        };

        let queued_at = Instant::now();
        let mut guard = Arc::clone(&loaded.model).lock_owned().await;
        debug!(
            lock_wait_ms = queued_at.elapsed().as_millis() as u64,
            width = image.width(),
            height = image.height(),
            "Acquired inference engine"
        );

        let text = tokio::task::spawn_blocking(move || guard.recognize(&image))
            .await
            .map_err(|e| InferenceError::Panicked(e.to_string()))??;

        Ok(text)
    }
}
