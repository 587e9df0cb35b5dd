use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::layout::{analyze_page_fill, PageFillAnalysis};
use crate::render::{RenderedFrame, PREVIEW_HANDLE};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PreviewResponse {
    pub frame: Arc<RenderedFrame>,
    pub fill: PageFillAnalysis,
}

/// GET /api/v1/preview
///
/// Serves the mounted preview frame when it is current. Otherwise lays out
/// the latest snapshot on demand without mounting it.
pub async fn handle_get_preview(
    State(state): State<AppState>,
) -> Result<Json<PreviewResponse>, AppError> {
    let snapshot = state.session.snapshot();
    let frame = match state.surfaces.resolve(PREVIEW_HANDLE) {
        Some(frame) if frame.revision == snapshot.revision => frame,
        _ => {
            let frame = tokio::task::spawn_blocking(move || {
                RenderedFrame::render(PREVIEW_HANDLE, &snapshot)
            })
            .await
            .context("Preview render task failed")?;
            Arc::new(frame)
        }
    };
    let fill = analyze_page_fill(&frame.page);
    Ok(Json(PreviewResponse { frame, fill }))
}
