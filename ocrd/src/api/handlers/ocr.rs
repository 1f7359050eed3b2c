use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::api::dto::{BatchResponse, ItemPayload};
use crate::api::extractors::ImageUpload;
use crate::api::state::AppState;
use crate::error::{OcrdError, Result};

const SINGLE_FIELDS: &[&str] = &["image", "file"];
const BATCH_FIELDS: &[&str] = &["images", "files"];

/// `POST /ocr`
///
/// Item failures (undecodable bytes, engine errors, deadline) are reported in
/// the body with a 200 status; only malformed requests are 4xx.
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    request_body(content = crate::api::dto::SingleUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recognized text, or an item-level error", body = ItemPayload),
        (status = 400, description = "Missing image field or malformed multipart body"),
        (status = 413, description = "Upload exceeds the configured size limit"),
    )
)]
pub async fn recognize_text(
    State(state): State<AppState>,
    upload: ImageUpload,
) -> Result<Json<ItemPayload>> {
    let input = upload
        .into_inputs(SINGLE_FIELDS, 1)
        .await?
        .pop()
        .ok_or_else(|| OcrdError::Validation("Missing required 'image' field".to_string()))?;

    let result = state
        .recognition
        .recognize_one_within(input, state.config.batch.timeout())
        .await;

    Ok(Json(result.into()))
}

/// `POST /ocr/batch`
///
/// `results[i]` always answers the i-th image; a failed item never shortens
/// or reorders the list.
#[utoipa::path(
    post,
    path = "/ocr/batch",
    tag = "ocr",
    request_body(content = crate::api::dto::BatchUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "One result per uploaded image, in upload order", body = BatchResponse),
        (status = 400, description = "Too many images or malformed multipart body"),
        (status = 413, description = "Upload exceeds the configured size limit"),
    )
)]
pub async fn recognize_batch(
    State(state): State<AppState>,
    upload: ImageUpload,
) -> Result<Json<BatchResponse>> {
    let inputs = upload
        .into_inputs(BATCH_FIELDS, state.config.batch.max_items)
        .await?;
    info!(items = inputs.len(), "Batch OCR request received");

    let results = state
        .recognition
        .recognize_batch(inputs, state.config.batch.timeout())
        .await;

    Ok(Json(results.into()))
}
