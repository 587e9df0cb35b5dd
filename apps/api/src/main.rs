mod config;
mod document;
mod errors;
mod export;
mod layout;
mod models;
mod projection;
mod render;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::{spawn_preview_surface, FontSet, SkiaRasterizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Fonts are read once; the rasterizer shares them across exports
    let fonts = tokio::task::spawn_blocking({
        let sans = config.font_sans_path.clone();
        let serif = config.font_serif_path.clone();
        move || FontSet::load(sans.as_deref(), serif.as_deref())
    })
    .await?;
    let rasterizer = Arc::new(SkiaRasterizer::new(fonts));

    let state = AppState::new(config.clone(), rasterizer)?;
    info!(
        template = %config.initial_template,
        export_dir = %config.export_dir.display(),
        upscale = config.export_upscale,
        overflow = ?config.export_overflow,
        "Editing session ready"
    );

    // Keeps the preview frame in sync with the document while the view is on preview
    spawn_preview_surface(state.session.clone(), state.surfaces.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
