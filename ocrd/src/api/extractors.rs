use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use tracing::debug;

use crate::error::{OcrdError, Result};
use crate::models::RawInput;

/// `multipart/form-data` body whose rejections use the service's error shape.
pub struct ImageUpload(pub Multipart);

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = OcrdError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(Self)
            .map_err(OcrdError::from)
    }
}

impl From<MultipartRejection> for OcrdError {
    fn from(rejection: MultipartRejection) -> Self {
        OcrdError::Validation(format!(
            "Expected a multipart/form-data request: {}",
            rejection.body_text()
        ))
    }
}

impl ImageUpload {
    /// Collect every field named in `field_names`, in the order the client sent them.
    ///
    /// Other fields are skipped. Zero-length files are kept: an empty image is
    /// an item-level decode failure, not a malformed request.
    pub async fn into_inputs(
        mut self,
        field_names: &[&str],
        max_items: usize,
    ) -> Result<Vec<RawInput>> {
        let mut inputs = Vec::new();

        loop {
            let field = match self.0.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err(map_multipart_error(e)),
            };

            let name = field.name().unwrap_or("").to_string();
            if !field_names.contains(&name.as_str()) {
                debug!(field = %name, "Ignoring unexpected multipart field");
                continue;
            }

            if inputs.len() >= max_items {
                return Err(OcrdError::Validation(format!(
                    "Too many images: at most {max_items} per request"
                )));
            }

            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(map_multipart_error)?;

            inputs.push(RawInput {
                bytes: bytes.to_vec(),
                filename,
                content_type,
            });
        }

        Ok(inputs)
    }
}

fn map_multipart_error(err: MultipartError) -> OcrdError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrdError::PayloadTooLarge(err.body_text())
    } else {
        OcrdError::Validation(format!("Failed to read upload: {}", err.body_text()))
    }
}
