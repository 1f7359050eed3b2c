use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ocrd API",
        version = "1.0.0",
        description = "Upload images, receive recognized text. Batch results keep upload order.",
    ),
    paths(
        handlers::health::health_check,
        handlers::ocr::recognize_text,
        handlers::ocr::recognize_batch,
    ),
    components(schemas(
        dto::ItemPayload,
        dto::BatchResponse,
        dto::SingleUploadForm,
        dto::BatchUploadForm,
        handlers::health::HealthData,
        handlers::health::EngineStatus,
        crate::ocr::EngineState,
    )),
    tags(
        (name = "health", description = "Engine readiness"),
        (name = "ocr", description = "Single and batch text recognition"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
