//! Session-scoped store for uploaded profile photos.
//!
//! Each upload is held under its own [`PhotoHandle`]. The session releases the
//! previous handle whenever the photo is replaced or cleared, so repeated
//! uploads never accumulate.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::PhotoHandle;

#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub bytes: Bytes,
    pub content_type: String,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PhotoStore {
    entries: HashMap<PhotoHandle, StoredPhoto>,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, bytes: Bytes, content_type: impl Into<String>) -> PhotoHandle {
        let handle = PhotoHandle::generate();
        let content_type = content_type.into();
        debug!(%handle, size = bytes.len(), %content_type, "Photo acquired");
        self.entries.insert(
            handle,
            StoredPhoto {
                bytes,
                content_type,
                acquired_at: Utc::now(),
            },
        );
        handle
    }

    /// Drops the bytes behind `handle`. Returns false if it was already gone.
    pub fn release(&mut self, handle: PhotoHandle) -> bool {
        let released = self.entries.remove(&handle).is_some();
        if released {
            debug!(%handle, "Photo released");
        }
        released
    }

    pub fn get(&self, handle: PhotoHandle) -> Option<&StoredPhoto> {
        self.entries.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
