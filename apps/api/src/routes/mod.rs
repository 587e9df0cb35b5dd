pub mod document;
pub mod export;
pub mod health;
pub mod preview;
pub mod view;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Upper bound on a photo upload.
const PHOTO_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document
        .route("/api/v1/document", get(document::handle_get_document))
        .route("/api/v1/document/edits", post(document::handle_apply_edit))
        .route(
            "/api/v1/document/photo",
            post(document::handle_upload_photo)
                .delete(document::handle_clear_photo)
                .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route(
            "/api/v1/document/photo/:handle",
            get(document::handle_get_photo),
        )
        // Preview and view state
        .route("/api/v1/preview", get(preview::handle_get_preview))
        .route(
            "/api/v1/view",
            get(view::handle_get_view).post(view::handle_dispatch_view),
        )
        // Export
        .route("/api/v1/export", post(export::handle_export))
        .route("/api/v1/export/status", get(export::handle_export_status))
        .route("/api/v1/export/latest", get(export::handle_export_latest))
        .with_state(state)
}
