use thiserror::Error;

use crate::render::{EncodeError, RasterError};

/// Failures that abort an export. None of them touch the document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("render target '{0}' is not mounted")]
    TargetNotFound(String),

    #[error("preview did not finish rendering revision {revision} within {timeout_ms}ms")]
    RenderTimeout { revision: u64, timeout_ms: u64 },

    #[error("rasterization failed: {0}")]
    Rasterize(#[from] RasterError),

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("writing the export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExportError {
    /// Stable machine-readable code for API responses and status reports.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::TargetNotFound(_) => "TARGET_NOT_FOUND",
            ExportError::RenderTimeout { .. } => "RENDER_TIMEOUT",
            ExportError::Rasterize(_) => "RASTERIZE_FAILED",
            ExportError::Encode(_) => "ENCODE_FAILED",
            ExportError::Io(_) => "IO_ERROR",
            ExportError::Task(_) => "TASK_FAILED",
        }
    }
}
