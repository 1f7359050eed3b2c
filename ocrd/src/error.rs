use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Process and transport level failures.
///
/// Per-item recognition failures never surface as `OcrdError`; those are
/// [`crate::models::RecognitionError`] values carried inside a response body.
#[derive(Error, Debug)]
pub enum OcrdError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),
}

impl IntoResponse for OcrdError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            OcrdError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            OcrdError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            internal @ OcrdError::EngineInit(_) => {
                tracing::error!(error = %internal, "Internal error mapped to response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, OcrdError>;
