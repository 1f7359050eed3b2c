mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{png_bytes, ready_engine, DimensionsModel, SlowModel, REJECTED_WIDTH};
use ocrd::config::BatchConfig;
use ocrd::models::{RawInput, RecognitionError};
use ocrd::ocr::{DecodeError, ImageDecoder, InferenceEngine, InferenceError};
use ocrd::services::RecognitionService;
use pretty_assertions::assert_eq;

fn service_with(engine: Arc<InferenceEngine>, concurrency: usize) -> RecognitionService {
    let batch = BatchConfig {
        max_items: 64,
        concurrency,
        timeout_secs: 0,
    };
    RecognitionService::new(engine, ImageDecoder::default(), &batch)
}

fn texts(results: &[ocrd::models::RecognitionResult]) -> Vec<Option<String>> {
    results
        .iter()
        .map(|r| r.text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_recognize_one_valid_image() {
    common::init_test_logger();
    let service = service_with(ready_engine(DimensionsModel), 2);

    let result = service
        .recognize_one(RawInput::new(png_bytes(40, 20)).with_filename("page.png"))
        .await;

    assert_eq!(result.index, 0);
    assert_eq!(result.filename.as_deref(), Some("page.png"));
    assert_eq!(result.text(), Some("40x20"));
}

#[tokio::test]
async fn test_recognize_one_zero_length_payload_is_decode_failure() {
    let service = service_with(ready_engine(DimensionsModel), 2);

    let result = service.recognize_one(RawInput::new(Vec::new())).await;

    assert_eq!(
        result.outcome,
        Err(RecognitionError::Decode(DecodeError::Empty))
    );
}

#[tokio::test]
async fn test_declared_content_type_is_advisory() {
    common::init_test_logger();
    let service = service_with(ready_engine(DimensionsModel), 2);

    let mislabeled = RawInput::new(png_bytes(16, 9))
        .with_filename("scan.pdf")
        .with_content_type("application/pdf");
    let result = service.recognize_one(mislabeled).await;
    assert_eq!(result.text(), Some("16x9"));

    let labeled_image = RawInput::new(b"not really a png".to_vec()).with_content_type("image/png");
    let result = service.recognize_one(labeled_image).await;
    assert_eq!(result.error().map(|e| e.kind()), Some("decode failed"));
}

#[tokio::test]
async fn test_recognize_one_inference_failure_is_captured() {
    let service = service_with(ready_engine(DimensionsModel), 2);

    let result = service
        .recognize_one(RawInput::new(png_bytes(REJECTED_WIDTH, 10)))
        .await;

    assert!(matches!(
        result.outcome,
        Err(RecognitionError::Inference(InferenceError::Rejected(_)))
    ));
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_corrupt_item() {
    let service = service_with(ready_engine(DimensionsModel), 3);

    let inputs = vec![
        RawInput::new(png_bytes(10, 5)),
        RawInput::new(b"garbage bytes, not an image".to_vec()),
        RawInput::new(png_bytes(30, 15)),
    ];

    let results = service.recognize_batch(inputs, None).await;

    assert_eq!(results.len(), 3);
    assert_eq!(
        results.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(results[0].text(), Some("10x5"));
    assert_eq!(results[1].error().map(|e| e.kind()), Some("decode failed"));
    assert_eq!(results[2].text(), Some("30x15"));
}

#[tokio::test]
async fn test_empty_batch_returns_empty_results() {
    let service = service_with(ready_engine(DimensionsModel), 2);

    let results = service
        .recognize_batch(Vec::new(), Some(Duration::from_secs(1)))
        .await;

    assert!(results.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_batch_returns_one_result_per_input_in_order() {
    let service = service_with(ready_engine(DimensionsModel), 4);

    let inputs: Vec<RawInput> = (1..=20)
        .map(|i| {
            if i % 5 == 0 {
                RawInput::new(vec![0u8; i as usize])
            } else {
                RawInput::new(png_bytes(i + 20, 1))
            }
        })
        .collect();

    let results = service.recognize_batch(inputs, None).await;

    assert_eq!(results.len(), 20);
    for (position, result) in results.iter().enumerate() {
        let i = position as u32 + 1;
        assert_eq!(result.index, position);
        if i % 5 == 0 {
            assert!(!result.is_success(), "item {i} should fail to decode");
        } else {
            assert_eq!(result.text(), Some(format!("{}x1", i + 20).as_str()));
        }
    }
}

#[tokio::test]
async fn test_mixed_failures_keep_positions() {
    let service = service_with(ready_engine(DimensionsModel), 2);

    let inputs = vec![
        RawInput::new(png_bytes(REJECTED_WIDTH, 4)),
        RawInput::new(png_bytes(8, 8)),
        RawInput::new(Vec::new()),
    ];

    let results = service.recognize_batch(inputs, None).await;

    assert_eq!(
        texts(&results),
        vec![None, Some("8x8".to_string()), None]
    );
    assert_eq!(results[0].error().map(|e| e.kind()), Some("inference failed"));
    assert_eq!(results[2].error().map(|e| e.kind()), Some("decode failed"));
}

#[tokio::test]
async fn test_engine_not_ready_fails_every_decodable_item() {
    let service = service_with(Arc::new(InferenceEngine::new()), 2);

    let inputs = vec![
        RawInput::new(png_bytes(5, 5)),
        RawInput::new(b"nope".to_vec()),
    ];

    let results = service.recognize_batch(inputs, None).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].outcome, Err(RecognitionError::EngineNotReady));
    assert_eq!(results[1].error().map(|e| e.kind()), Some("decode failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_deadline_marks_unfinished_items_as_timed_out() {
    let engine = ready_engine(SlowModel {
        delay: Duration::from_millis(100),
    });
    let service = service_with(engine, 1);

    let inputs: Vec<RawInput> = (1..=6)
        .map(|i| RawInput::new(png_bytes(i, i)).with_filename(format!("{i}.png")))
        .collect();

    let results = service
        .recognize_batch(inputs, Some(Duration::from_millis(250)))
        .await;

    assert_eq!(results.len(), 6);
    assert_eq!(results[0].text(), Some("1x1"));

    let last = &results[5];
    assert_eq!(last.index, 5);
    assert_eq!(last.filename.as_deref(), Some("6.png"));
    assert_eq!(
        last.outcome,
        Err(RecognitionError::Timeout(Duration::from_millis(250)))
    );

    // With a single pipeline items finish in order, so successes form a prefix.
    let first_timeout = results
        .iter()
        .position(|r| !r.is_success())
        .expect("at least one item must time out");
    assert!(results[first_timeout..]
        .iter()
        .all(|r| matches!(r.outcome, Err(RecognitionError::Timeout(_)))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_item_deadline() {
    let engine = ready_engine(SlowModel {
        delay: Duration::from_millis(300),
    });
    let service = service_with(engine, 1);

    let result = service
        .recognize_one_within(
            RawInput::new(png_bytes(3, 3)),
            Some(Duration::from_millis(50)),
        )
        .await;

    assert_eq!(result.error().map(|e| e.kind()), Some("timed out"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_share_one_engine() {
    let service = service_with(ready_engine(DimensionsModel), 2);

    let batches = (0..4u32).map(|n| {
        let service = service.clone();
        tokio::spawn(async move {
            let inputs = (1..=5).map(|i| RawInput::new(png_bytes(i + n * 10, 2))).collect();
            (n, service.recognize_batch(inputs, None).await)
        })
    });

    for handle in futures::future::join_all(batches).await {
        let (n, results) = handle.unwrap();
        let expected: Vec<Option<String>> = (1..=5)
            .map(|i| {
                let width = i + n * 10;
                if width == REJECTED_WIDTH {
                    None
                } else {
                    Some(format!("{width}x2"))
                }
            })
            .collect();
        assert_eq!(texts(&results), expected);
    }
}
