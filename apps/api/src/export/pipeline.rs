//! Export pipeline: captures the preview surface and writes a PDF.
//!
//! One run at a time. A second call while a run is in flight returns
//! [`ExportOutcome::AlreadyRunning`] without touching anything. The view that
//! was showing before the run is restored whether it succeeds or fails.
//!
//! # Stages
//! 1. `Preparing`: force the preview view, then wait for the surface to mount
//!    a frame that has caught up with the current document revision.
//! 2. `Rendering`: load photos and rasterize the frame at `upscale`.
//! 3. `Rasterizing`: cut the raster into A4 page images (clip or paginate).
//! 4. `Encoding`: encode the PDF and write it atomically to the export dir.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::export::error::ExportError;
use crate::export::filename::export_filename;
use crate::export::state::ExportState;
use crate::layout::{analyze_page_fill, PageFillAnalysis, PageFillVerdict};
use crate::models::Template;
use crate::render::{
    encode_pdf, slice_pages, ImageLoader, OverflowPolicy, SurfaceRasterizer, SurfaceRegistry,
    PREVIEW_HANDLE,
};
use crate::session::{EditorSession, ViewMode};

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub export_dir: PathBuf,
    /// Device pixels per page pixel when capturing.
    pub upscale: f32,
    pub overflow: OverflowPolicy,
    /// Upper bound on waiting for the preview to catch up.
    pub settle_timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub id: Uuid,
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: usize,
    pub pages: usize,
    pub revision: u64,
    pub template: Template,
    pub overflow: OverflowPolicy,
    pub fill: PageFillAnalysis,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportFailure {
    pub code: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportStatus {
    pub state: ExportState,
    pub last_report: Option<ExportReport>,
    pub last_error: Option<ExportFailure>,
}

#[derive(Debug)]
pub enum ExportOutcome {
    Completed(ExportReport),
    AlreadyRunning,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    session: Arc<EditorSession>,
    surfaces: SurfaceRegistry,
    images: ImageLoader,
    rasterizer: Arc<dyn SurfaceRasterizer>,
    settings: ExportSettings,
    busy: AtomicBool,
    status: watch::Sender<ExportStatus>,
}

#[derive(Clone)]
pub struct ExportPipeline {
    inner: Arc<Inner>,
}

impl ExportPipeline {
    pub fn new(
        session: Arc<EditorSession>,
        surfaces: SurfaceRegistry,
        images: ImageLoader,
        rasterizer: Arc<dyn SurfaceRasterizer>,
        settings: ExportSettings,
    ) -> Self {
        let (status, _rx) = watch::channel(ExportStatus {
            state: ExportState::Idle,
            last_report: None,
            last_error: None,
        });
        ExportPipeline {
            inner: Arc::new(Inner {
                session,
                surfaces,
                images,
                rasterizer,
                settings,
                busy: AtomicBool::new(false),
                status,
            }),
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.inner.status.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// The most recent successful export, if any.
    pub fn latest(&self) -> Option<ExportReport> {
        self.inner.status.borrow().last_report.clone()
    }

    pub async fn run(&self) -> Result<ExportOutcome, ExportError> {
        let Some(_busy) = BusyGuard::acquire(&self.inner.busy) else {
            info!("Export requested while another is running");
            return Ok(ExportOutcome::AlreadyRunning);
        };

        let started_at = Utc::now();
        self.transition(ExportState::Preparing);
        let previous_view = self.inner.session.view().force(ViewMode::Preview);

        let result = self.execute(started_at).await;

        self.inner.session.view().force(previous_view);
        match &result {
            Ok(report) => {
                info!(
                    filename = %report.filename,
                    pages = report.pages,
                    size_bytes = report.size_bytes,
                    revision = report.revision,
                    "Export completed"
                );
                self.inner.status.send_modify(|status| {
                    debug_assert!(status.state.can_transition_to(ExportState::Done));
                    status.state = ExportState::Done;
                    status.last_report = Some(report.clone());
                    status.last_error = None;
                });
            }
            Err(e) => {
                error!(code = e.code(), "Export failed: {e}");
                self.inner.status.send_modify(|status| {
                    status.state = ExportState::Failed;
                    status.last_error = Some(ExportFailure {
                        code: e.code(),
                        message: e.to_string(),
                        at: Utc::now(),
                    });
                });
            }
        }
        result.map(ExportOutcome::Completed)
    }

    async fn execute(&self, started_at: DateTime<Utc>) -> Result<ExportReport, ExportError> {
        let inner = &self.inner;
        let settings = &inner.settings;
        let snapshot = inner.session.snapshot();

        // Preparing: wait for the surface to reflect this revision.
        let frame = match inner
            .surfaces
            .wait_for(PREVIEW_HANDLE, snapshot.revision, settings.settle_timeout)
            .await
        {
            Some(frame) => frame,
            None if inner.surfaces.resolve(PREVIEW_HANDLE).is_none() => {
                return Err(ExportError::TargetNotFound(PREVIEW_HANDLE.to_string()));
            }
            None => {
                return Err(ExportError::RenderTimeout {
                    revision: snapshot.revision,
                    timeout_ms: settings.settle_timeout.as_millis() as u64,
                });
            }
        };
        debug!(revision = frame.revision, "Preview settled");

        // Rendering
        self.transition(ExportState::Rendering);
        let photos = inner
            .images
            .load_all(frame.page.photos(), &inner.session)
            .await;
        let raster = inner
            .rasterizer
            .rasterize(frame.clone(), Arc::new(photos), settings.upscale)
            .await?;

        // Rasterizing
        self.transition(ExportState::Rasterizing);
        let fill = analyze_page_fill(&frame.page);
        if fill.verdict == PageFillVerdict::Overflow && settings.overflow == OverflowPolicy::Clip {
            warn!(
                pages_needed = fill.pages_needed,
                overflow = fill.overflow_fraction,
                "Content is taller than one page and will be clipped"
            );
        }
        let page = frame.page.transform.page;
        let overflow = settings.overflow;
        let pages = tokio::task::spawn_blocking(move || slice_pages(&raster, page, overflow)).await?;
        let page_count = pages.len();

        // Encoding
        self.transition(ExportState::Encoding);
        let bytes = tokio::task::spawn_blocking(move || encode_pdf(&pages, page)).await??;
        let size_bytes = bytes.len();
        // Named after the document that was rendered, not the one asked for.
        let filename = export_filename(&frame.document.personal_info.full_name);
        let dir = settings.export_dir.clone();
        let target = filename.clone();
        let path = tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &bytes)).await??;

        Ok(ExportReport {
            id: Uuid::now_v7(),
            filename,
            path,
            size_bytes,
            pages: page_count,
            revision: frame.revision,
            template: frame.tree.template,
            overflow,
            fill,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn transition(&self, next: ExportState) {
        self.inner.status.send_modify(|status| {
            debug_assert!(
                status.state.can_transition_to(next),
                "{:?} -> {next:?}",
                status.state
            );
            debug!(from = ?status.state, to = ?next, "Export stage");
            status.state = next;
        });
    }
}

/// Writes through a temp file in the same directory, so a reader never sees
/// a partial PDF.
fn write_atomically(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    let path = dir.join(filename);
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}
