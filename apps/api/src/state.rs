use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::export::{ExportPipeline, ExportSettings};
use crate::models::defaults::default_document;
use crate::render::{ImageLoader, SurfaceRasterizer, SurfaceRegistry};
use crate::session::{EditorSession, ViewMode};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single editing session this process serves.
    pub session: Arc<EditorSession>,
    pub surfaces: SurfaceRegistry,
    pub exporter: ExportPipeline,
    pub config: Config,
}

impl AppState {
    /// Starts from the sample document in the configured template, with the
    /// editor open. The preview surface task is spawned by the caller.
    pub fn new(config: Config, rasterizer: Arc<dyn SurfaceRasterizer>) -> Result<Self> {
        let session = Arc::new(EditorSession::new(
            default_document(config.initial_template),
            ViewMode::Editor,
        ));
        let surfaces = SurfaceRegistry::new();
        let images = ImageLoader::new(config.allow_remote_images, config.remote_image_timeout)?;
        let exporter = ExportPipeline::new(
            session.clone(),
            surfaces.clone(),
            images,
            rasterizer,
            ExportSettings {
                export_dir: config.export_dir.clone(),
                upscale: config.export_upscale,
                overflow: config.export_overflow,
                settle_timeout: config.render_settle_timeout,
            },
        );
        Ok(AppState {
            session,
            surfaces,
            exporter,
            config,
        })
    }
}
