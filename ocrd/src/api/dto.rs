use serde::{Deserialize, Serialize};

use crate::models::RecognitionResult;

/// Wire shape of one recognition outcome: `{ "text": ... }` on success,
/// `{ "error": ..., "detail": ... }` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ItemPayload {
    Text {
        text: String,
    },
    Error {
        /// Failure kind: `decode failed`, `inference failed`, `engine not ready` or `timed out`.
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl From<RecognitionResult> for ItemPayload {
    fn from(result: RecognitionResult) -> Self {
        match result.outcome {
            Ok(text) => ItemPayload::Text { text },
            Err(e) => ItemPayload::Error {
                error: e.kind().to_string(),
                detail: e.detail(),
            },
        }
    }
}

/// `results[i]` corresponds to the i-th uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BatchResponse {
    pub results: Vec<ItemPayload>,
}

impl From<Vec<RecognitionResult>> for BatchResponse {
    fn from(results: Vec<RecognitionResult>) -> Self {
        Self {
            results: results.into_iter().map(ItemPayload::from).collect(),
        }
    }
}

/// Multipart body of `POST /ocr` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct SingleUploadForm {
    /// Image file. `file` is accepted as an alias.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart body of `POST /ocr/batch` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct BatchUploadForm {
    /// Repeated image files; order is preserved. `files` is accepted as an alias.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
}
