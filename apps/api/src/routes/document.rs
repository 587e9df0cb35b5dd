use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use image::ImageFormat;
use serde::Serialize;
use tracing::info;

use crate::document::Edit;
use crate::errors::AppError;
use crate::models::PhotoHandle;
use crate::session::{DocumentSnapshot, EditOutcome};
use crate::state::AppState;

/// Multipart field carrying the photo bytes.
const PHOTO_FIELD: &str = "photo";

#[derive(Serialize)]
pub struct PhotoUploadResponse {
    pub handle: PhotoHandle,
    pub revision: u64,
    pub content_type: String,
    pub size_bytes: usize,
}

#[derive(Serialize)]
pub struct RevisionResponse {
    pub revision: u64,
}

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<DocumentSnapshot> {
    Json(state.session.snapshot())
}

/// POST /api/v1/document/edits
///
/// Unknown templates, colors or field names fail deserialization and come
/// back as a validation error; everything that parses is applied.
pub async fn handle_apply_edit(
    State(state): State<AppState>,
    payload: Result<Json<Edit>, JsonRejection>,
) -> Result<Json<EditOutcome>, AppError> {
    let Json(edit) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(state.session.apply(&edit)))
}

/// POST /api/v1/document/photo
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let content_type = sniff_image(&bytes)?;
        let size_bytes = bytes.len();
        let (handle, revision) = state.session.replace_photo(bytes, content_type);
        info!(%handle, size_bytes, content_type, "Photo uploaded");
        return Ok(Json(PhotoUploadResponse {
            handle,
            revision,
            content_type: content_type.to_string(),
            size_bytes,
        }));
    }
    Err(AppError::Validation(format!(
        "multipart field '{PHOTO_FIELD}' is required"
    )))
}

/// DELETE /api/v1/document/photo
pub async fn handle_clear_photo(State(state): State<AppState>) -> Json<RevisionResponse> {
    Json(RevisionResponse {
        revision: state.session.clear_photo(),
    })
}

/// GET /api/v1/document/photo/:handle
pub async fn handle_get_photo(
    State(state): State<AppState>,
    Path(handle): Path<PhotoHandle>,
) -> Result<Response, AppError> {
    let photo = state
        .session
        .photo(handle)
        .ok_or_else(|| AppError::NotFound(format!("photo {handle}")))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, photo.content_type)],
        photo.bytes,
    )
        .into_response())
}

/// Content type of an accepted upload. Only formats the rasterizer decodes.
fn sniff_image(bytes: &Bytes) -> Result<&'static str, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("photo is empty".to_string()));
    }
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(other) => Err(AppError::Validation(format!(
            "unsupported image format {other:?}; use PNG or JPEG"
        ))),
        Err(_) => Err(AppError::Validation(
            "photo is not a recognizable image".to_string(),
        )),
    }
}
