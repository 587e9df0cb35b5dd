//! Preview surface: the live, laid-out document shown while the preview view
//! is open.
//!
//! A background task projects and lays out every new document revision while
//! the view is `Preview` and mounts the result under [`PREVIEW_HANDLE`].
//! Mounting is the render-complete signal: the export pipeline waits for a
//! frame whose revision has caught up with the document instead of sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::layout::{layout, ContentTransform, LaidOutPage, PageGeometry};
use crate::models::ResumeDocument;
use crate::projection::{project, RenderTree};
use crate::session::{DocumentSnapshot, EditorSession, ViewMode};

/// Stable handle of the full-document preview.
pub const PREVIEW_HANDLE: &str = "resume-preview";

#[derive(Debug, Clone, Serialize)]
pub struct RenderedFrame {
    pub handle: String,
    /// Document revision this frame was laid out from.
    pub revision: u64,
    /// The document at that revision. Kept out of the preview payload.
    #[serde(skip)]
    pub document: Arc<ResumeDocument>,
    pub tree: RenderTree,
    pub page: LaidOutPage,
    pub mounted_at: DateTime<Utc>,
}

impl RenderedFrame {
    /// Projects and lays out a snapshot. CPU-bound.
    pub fn render(handle: &str, snapshot: &DocumentSnapshot) -> Self {
        let doc = &snapshot.document;
        let tree = project(doc);
        let transform = ContentTransform::new(doc.content_scale, PageGeometry::A4);
        let page = layout(&tree, &transform);
        RenderedFrame {
            handle: handle.to_string(),
            revision: snapshot.revision,
            document: Arc::clone(&snapshot.document),
            tree,
            page,
            mounted_at: Utc::now(),
        }
    }
}

type Frames = HashMap<String, Arc<RenderedFrame>>;

/// Mounted frames by handle. Clones share the same registry.
#[derive(Clone)]
pub struct SurfaceRegistry {
    tx: Arc<watch::Sender<Frames>>,
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HashMap::new());
        SurfaceRegistry { tx: Arc::new(tx) }
    }

    pub fn mount(&self, frame: RenderedFrame) {
        let handle = frame.handle.clone();
        let revision = frame.revision;
        self.tx.send_modify(|frames| {
            frames.insert(handle.clone(), Arc::new(frame));
        });
        debug!(%handle, revision, "Frame mounted");
    }

    pub fn unmount(&self, handle: &str) {
        let removed = self
            .tx
            .send_if_modified(|frames| frames.remove(handle).is_some());
        if removed {
            debug!(%handle, "Frame unmounted");
        }
    }

    pub fn resolve(&self, handle: &str) -> Option<Arc<RenderedFrame>> {
        self.tx.borrow().get(handle).cloned()
    }

    /// Waits until `handle` carries a frame of at least `min_revision`.
    /// Returns `None` if that does not happen within `timeout`.
    pub async fn wait_for(
        &self,
        handle: &str,
        min_revision: u64,
        timeout: Duration,
    ) -> Option<Arc<RenderedFrame>> {
        let mut rx = self.tx.subscribe();
        let ready = rx.wait_for(|frames| {
            frames
                .get(handle)
                .is_some_and(|frame| frame.revision >= min_revision)
        });
        // Bound to a local: the `Ref` must be released before `rx` drops.
        let frame = match tokio::time::timeout(timeout, ready).await {
            Ok(Ok(frames)) => frames.get(handle).cloned(),
            // Sender lives in self, so the channel cannot close while we hold it.
            Ok(Err(_)) => None,
            Err(_) => None,
        };
        frame
    }
}

/// Starts the task that keeps [`PREVIEW_HANDLE`] in sync with the session.
pub fn spawn_preview_surface(
    session: Arc<EditorSession>,
    registry: SurfaceRegistry,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut docs = session.subscribe();
        let mut views = session.view().subscribe();
        info!(handle = PREVIEW_HANDLE, "Preview surface started");

        loop {
            let view = *views.borrow_and_update();
            let snapshot = docs.borrow_and_update().clone();

            if view == ViewMode::Preview {
                let current = registry.resolve(PREVIEW_HANDLE).map(|f| f.revision);
                if current != Some(snapshot.revision) {
                    match tokio::task::spawn_blocking(move || {
                        RenderedFrame::render(PREVIEW_HANDLE, &snapshot)
                    })
                    .await
                    {
                        Ok(frame) => registry.mount(frame),
                        Err(e) => error!("Preview render task failed: {e}"),
                    }
                }
            } else {
                registry.unmount(PREVIEW_HANDLE);
            }

            tokio::select! {
                changed = docs.changed() => if changed.is_err() { break },
                changed = views.changed() => if changed.is_err() { break },
            }
        }
        info!(handle = PREVIEW_HANDLE, "Preview surface stopped");
    })
}
