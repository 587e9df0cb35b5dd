pub mod error;
pub mod filename;
pub mod pipeline;
pub mod state;

pub use error::ExportError;
pub use filename::{export_filename, DEFAULT_FILENAME};
pub use pipeline::{ExportOutcome, ExportPipeline, ExportReport, ExportSettings, ExportStatus};
pub use state::ExportState;
