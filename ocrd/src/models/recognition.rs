use std::time::Duration;

use thiserror::Error;

use crate::ocr::{DecodeError, InferenceError};

/// Why a single item produced no text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("engine not ready")]
    EngineNotReady,

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl RecognitionError {
    /// Short, stable label used as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode failed",
            Self::Inference(_) => "inference failed",
            Self::EngineNotReady => "engine not ready",
            Self::Timeout(_) => "timed out",
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Decode(e) => Some(e.to_string()),
            Self::Inference(e) => Some(e.to_string()),
            Self::EngineNotReady => None,
            Self::Timeout(limit) => Some(format!(
                "request deadline of {}ms elapsed before this item finished",
                limit.as_millis()
            )),
        }
    }
}

/// Outcome for the input at `index` of the originating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub index: usize,
    pub filename: Option<String>,
    pub outcome: Result<String, RecognitionError>,
}

impl RecognitionResult {
    pub fn success(index: usize, filename: Option<String>, text: String) -> Self {
        Self {
            index,
            filename,
            outcome: Ok(text),
        }
    }

    pub fn failure(index: usize, filename: Option<String>, error: RecognitionError) -> Self {
        Self {
            index,
            filename,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&RecognitionError> {
        self.outcome.as_ref().err()
    }
}

/// Per-batch counters, logged once the batch is assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[RecognitionResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                summary.total += 1;
                match &result.outcome {
                    Ok(_) => summary.succeeded += 1,
                    Err(RecognitionError::Timeout(_)) => summary.timed_out += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }
}
