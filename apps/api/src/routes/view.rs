use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::session::{ViewAction, ViewMode};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ViewResponse {
    pub view: ViewMode,
}

/// GET /api/v1/view
pub async fn handle_get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    Json(ViewResponse {
        view: state.session.view().current(),
    })
}

/// POST /api/v1/view
pub async fn handle_dispatch_view(
    State(state): State<AppState>,
    Json(action): Json<ViewAction>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = state
        .session
        .dispatch_view(action)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(ViewResponse { view }))
}
