use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::errors::AppError;
use crate::export::{ExportError, ExportOutcome, ExportStatus};
use crate::state::AppState;

/// POST /api/v1/export
///
/// Runs on its own task so a dropped client connection cannot abandon an
/// export halfway. Returns 202 without doing anything if one is in flight.
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let outcome = if state.exporter.is_busy() {
        ExportOutcome::AlreadyRunning
    } else {
        let exporter = state.exporter.clone();
        tokio::spawn(async move { exporter.run().await })
            .await
            .map_err(ExportError::from)??
    };

    Ok(match outcome {
        ExportOutcome::Completed(report) => (StatusCode::OK, Json(report)).into_response(),
        ExportOutcome::AlreadyRunning => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "already_running" })),
        )
            .into_response(),
    })
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<ExportStatus> {
    Json(state.exporter.status())
}

/// GET /api/v1/export/latest
pub async fn handle_export_latest(State(state): State<AppState>) -> Result<Response, AppError> {
    let report = state
        .exporter
        .latest()
        .ok_or_else(|| AppError::NotFound("no export has completed yet".to_string()))?;
    let bytes = match tokio::fs::read(&report.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("{} was removed", report.filename)));
        }
        Err(e) => return Err(AppError::Export(ExportError::Io(e))),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&report.filename)),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
