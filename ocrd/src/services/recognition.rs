use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::models::{BatchSummary, RawInput, RecognitionError, RecognitionResult};
use crate::ocr::{sniff_media_type, DecodeError, ImageDecoder, InferenceEngine};

/// Request orchestrator: decode, then recognize, for one or many uploads.
///
/// Failures of individual items are captured in their [`RecognitionResult`];
/// nothing here returns an error to the caller. There are no retries.
#[derive(Clone)]
pub struct RecognitionService {
    engine: Arc<InferenceEngine>,
    decoder: ImageDecoder,
    concurrency: usize,
}

impl RecognitionService {
    pub fn new(engine: Arc<InferenceEngine>, decoder: ImageDecoder, batch: &BatchConfig) -> Self {
        Self {
            engine,
            decoder,
            concurrency: batch.concurrency.max(1),
        }
    }

    pub async fn recognize_one(&self, input: RawInput) -> RecognitionResult {
        self.process(0, input).await
    }

    /// [`Self::recognize_one`] bounded by `deadline`; an elapsed deadline
    /// yields a [`RecognitionError::Timeout`] result.
    pub async fn recognize_one_within(
        &self,
        input: RawInput,
        deadline: Option<Duration>,
    ) -> RecognitionResult {
        let Some(limit) = deadline else {
            return self.recognize_one(input).await;
        };

        let filename = input.filename.clone();
        match tokio::time::timeout(limit, self.process(0, input)).await {
            Ok(result) => result,
            Err(_) => RecognitionResult::failure(0, filename, RecognitionError::Timeout(limit)),
        }
    }

    /// Recognize every input, returning exactly one result per input in
    /// input order.
    ///
    /// Up to `concurrency` items decode in parallel; recognition itself still
    /// queues on the engine lock. When `deadline` elapses, finished results
    /// are kept and every unfinished slot becomes a timeout failure.
    pub async fn recognize_batch(
        &self,
        inputs: Vec<RawInput>,
        deadline: Option<Duration>,
    ) -> Vec<RecognitionResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("batch", %request_id, items = inputs.len());

        self.recognize_batch_inner(inputs, deadline)
            .instrument(span)
            .await
    }

    async fn recognize_batch_inner(
        &self,
        inputs: Vec<RawInput>,
        deadline: Option<Duration>,
    ) -> Vec<RecognitionResult> {
        if inputs.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let total = inputs.len();
        let filenames: Vec<Option<String>> = inputs.iter().map(|i| i.filename.clone()).collect();
        let mut slots: Vec<Option<RecognitionResult>> =
            std::iter::repeat_with(|| None).take(total).collect();

        let mut pending = pin!(stream::iter(inputs.into_iter().enumerate())
            .map(|(index, input)| self.process(index, input))
            .buffer_unordered(self.concurrency));

        let drain = async {
            while let Some(result) = pending.next().await {
                let index = result.index;
                slots[index] = Some(result);
            }
        };

        match deadline {
            Some(limit) => {
                if tokio::time::timeout(limit, drain).await.is_err() {
                    debug!(deadline_ms = limit.as_millis() as u64, "Batch deadline elapsed");
                }
            }
            None => drain.await,
        }

        let results: Vec<RecognitionResult> = slots
            .into_iter()
            .zip(filenames)
            .enumerate()
            .map(|(index, (slot, filename))| {
                slot.unwrap_or_else(|| {
                    let limit = deadline.unwrap_or_default();
                    RecognitionResult::failure(index, filename, RecognitionError::Timeout(limit))
                })
            })
            .collect();

        let summary = BatchSummary::from_results(&results);
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch recognition finished"
        );

        results
    }

    async fn process(&self, index: usize, input: RawInput) -> RecognitionResult {
        let filename = input.filename.clone();

        match self.decode_and_recognize(input).await {
            Ok(text) => {
                debug!(index, chars = text.chars().count(), "Item recognized");
                RecognitionResult::success(index, filename, text)
            }
            Err(error) => {
                debug!(index, error = %error, "Item failed");
                RecognitionResult::failure(index, filename, error)
            }
        }
    }

    async fn decode_and_recognize(&self, input: RawInput) -> Result<String, RecognitionError> {
        let decoder = self.decoder.clone();

        let image = tokio::task::spawn_blocking(move || {
            log_declared_type_mismatch(&input);
            decoder.decode(&input.bytes)
        })
        .await
        .map_err(|e| DecodeError::Corrupt(format!("decoder task panicked: {e}")))??;

        self.engine.recognize(image).await
    }
}

/// The declared content type is advisory; note when it disagrees with the bytes.
fn log_declared_type_mismatch(input: &RawInput) {
    let Some(declared) = input.content_type.as_deref() else {
        return;
    };
    if input.is_empty() || declared == "application/octet-stream" {
        return;
    }

    let sniffed = sniff_media_type(&input.bytes);
    if sniffed != "unknown" && !declared.eq_ignore_ascii_case(&sniffed) {
        debug!(
            declared,
            sniffed = %sniffed,
            filename = input.filename.as_deref().unwrap_or(""),
            "Declared content type does not match payload"
        );
    }
}
