//! The single editing session: current document snapshot, uploaded photos and
//! the view state.
//!
//! Snapshots are `Arc<ResumeDocument>` published on a `watch` channel with a
//! revision counter. Every edit replaces the snapshot wholesale inside
//! `send_if_modified`, which serializes read-modify-write and wakes the preview
//! surface only when something actually changed.

pub mod view;

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::document::photo::StoredPhoto;
use crate::document::{Created, Edit, PhotoStore};
use crate::models::{PhotoHandle, PhotoRef, ResumeDocument};

pub use view::{ViewAction, ViewController, ViewError, ViewMode};

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub revision: u64,
    pub document: Arc<ResumeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditOutcome {
    pub revision: u64,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Created>,
}

pub struct EditorSession {
    doc_tx: watch::Sender<DocumentSnapshot>,
    photos: Mutex<PhotoStore>,
    view: ViewController,
}

impl EditorSession {
    pub fn new(initial: ResumeDocument, view: ViewMode) -> Self {
        let (doc_tx, _rx) = watch::channel(DocumentSnapshot {
            revision: 0,
            document: Arc::new(initial),
        });
        EditorSession {
            doc_tx,
            photos: Mutex::new(PhotoStore::new()),
            view: ViewController::new(view),
        }
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.doc_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DocumentSnapshot> {
        self.doc_tx.subscribe()
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Applies one edit to the current snapshot.
    pub fn apply(&self, edit: &Edit) -> EditOutcome {
        let mut created = None;
        let changed = self.replace_with(|doc| {
            let (next, new_id) = edit.apply(doc);
            created = new_id;
            next
        });
        let revision = self.doc_tx.borrow().revision;
        debug!(edit = edit.name(), revision, changed, "Edit applied");
        EditOutcome {
            revision,
            changed,
            created,
        }
    }

    /// Stores an uploaded image and points the document at it. Any previous
    /// upload is released.
    pub fn replace_photo(&self, bytes: Bytes, content_type: impl Into<String>) -> (PhotoHandle, u64) {
        let handle = self.lock_photos().acquire(bytes, content_type);
        self.replace_with(|doc| doc.set_photo(Some(PhotoRef::Local { handle })));
        let revision = self.doc_tx.borrow().revision;
        info!(%handle, revision, "Photo uploaded");
        (handle, revision)
    }

    pub fn clear_photo(&self) -> u64 {
        self.replace_with(|doc| doc.set_photo(None));
        self.doc_tx.borrow().revision
    }

    /// Bytes behind a local photo handle, if it is still live.
    pub fn photo(&self, handle: PhotoHandle) -> Option<StoredPhoto> {
        self.lock_photos().get(handle).cloned()
    }

    pub fn live_photo_count(&self) -> usize {
        self.lock_photos().live_count()
    }

    /// Applies a user view action. Choosing a template also sets it on the document.
    pub fn dispatch_view(&self, action: ViewAction) -> Result<ViewMode, ViewError> {
        let mode = self.view.dispatch(action)?;
        if let ViewAction::ChooseTemplate { template } = action {
            self.replace_with(|doc| doc.set_template(template));
        }
        Ok(mode)
    }

    /// Publishes `f(current)` as the next revision when it differs, releasing
    /// an uploaded photo the new document no longer references.
    fn replace_with(&self, f: impl FnOnce(&ResumeDocument) -> ResumeDocument) -> bool {
        let mut released = None;
        let changed = self.doc_tx.send_if_modified(|snapshot| {
            let next = f(&snapshot.document);
            if next == *snapshot.document {
                return false;
            }
            let old_handle = snapshot
                .document
                .personal_info
                .photo
                .as_ref()
                .and_then(PhotoRef::local_handle);
            let new_handle = next.personal_info.photo.as_ref().and_then(PhotoRef::local_handle);
            if old_handle != new_handle {
                released = old_handle;
            }
            snapshot.document = Arc::new(next);
            snapshot.revision += 1;
            true
        });
        if let Some(handle) = released {
            self.lock_photos().release(handle);
        }
        changed
    }

    fn lock_photos(&self) -> MutexGuard<'_, PhotoStore> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.photos.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::{PersonalField, SectionId, Template};

    fn session() -> EditorSession {
        EditorSession::new(default_document(Template::Modern), ViewMode::Editor)
    }

    #[test]
    fn test_edit_bumps_revision_and_publishes() {
        let session = session();
        let mut rx = session.subscribe();
        let outcome = session.apply(&Edit::SetPersonalField {
            field: PersonalField::FullName,
            value: "Ana Souza".into(),
        });
        assert!(outcome.changed);
        assert_eq!(outcome.revision, 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().document.personal_info.full_name, "Ana Souza");
    }

    #[test]
    fn test_noop_edit_keeps_revision() {
        let session = session();
        let mut rx = session.subscribe();
        let outcome = session.apply(&Edit::RemoveSection {
            id: SectionId::new("missing"),
        });
        assert!(!outcome.changed);
        assert_eq!(outcome.revision, 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let session = session();
        let before = session.snapshot();
        session.apply(&Edit::RemoveSection {
            id: SectionId::new("edu"),
        });
        assert!(before.document.section(&SectionId::new("edu")).is_some());
        assert!(session.snapshot().document.section(&SectionId::new("edu")).is_none());
    }

    #[test]
    fn test_replacing_photo_releases_previous_upload() {
        let session = session();
        let (first, _) = session.replace_photo(Bytes::from_static(b"one"), "image/png");
        assert_eq!(session.live_photo_count(), 1);

        let (second, _) = session.replace_photo(Bytes::from_static(b"two"), "image/jpeg");
        assert_ne!(first, second);
        assert_eq!(session.live_photo_count(), 1);
        assert!(session.photo(first).is_none());
        assert_eq!(session.photo(second).unwrap().bytes, Bytes::from_static(b"two"));

        session.clear_photo();
        assert_eq!(session.live_photo_count(), 0);
        assert!(session.snapshot().document.personal_info.photo.is_none());
    }

    #[test]
    fn test_remote_url_releases_upload() {
        let session = session();
        session.replace_photo(Bytes::from_static(b"one"), "image/png");
        session.apply(&Edit::SetPhotoUrl {
            url: Some("https://example.com/me.png".into()),
        });
        assert_eq!(session.live_photo_count(), 0);
    }

    #[test]
    fn test_choose_template_sets_document_template() {
        let session = EditorSession::new(default_document(Template::Modern), ViewMode::Home);
        let mode = session
            .dispatch_view(ViewAction::ChooseTemplate {
                template: Template::Minimal,
            })
            .unwrap();
        assert_eq!(mode, ViewMode::Editor);
        assert_eq!(session.snapshot().document.template, Template::Minimal);
    }

    #[test]
    fn test_rejected_view_action_leaves_document_alone() {
        let session = session();
        let err = session
            .dispatch_view(ViewAction::ChooseTemplate {
                template: Template::Classic,
            })
            .unwrap_err();
        assert_eq!(err.from, ViewMode::Editor);
        assert_eq!(session.snapshot().document.template, Template::Modern);
        assert_eq!(session.snapshot().revision, 0);
    }
}
