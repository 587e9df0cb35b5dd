use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the session's current revision and view.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.session.snapshot();
    let export = state.exporter.status();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "revision": snapshot.revision,
        "view": state.session.view().current(),
        "export_state": export.state,
        "export_running": export.state.is_running(),
        "export_overflow": state.config.export_overflow,
    }))
}
