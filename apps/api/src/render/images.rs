/// Photo loading for export rasterization.
///
/// Local uploads come from the session photo store; remote URLs are fetched
/// only when the remote-image policy allows it. A photo that cannot be loaded
/// is left out of the raster with a warning; it never fails the export.
use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::PhotoRef;
use crate::session::EditorSession;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote image returned status {status}")]
    Status { status: u16 },

    #[error("remote images are disabled")]
    RemoteDisabled,

    #[error("uploaded photo {0} is no longer available")]
    MissingUpload(String),

    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Decoded photo pixels, RGBA8 with straight alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPhoto {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedPhoto {
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Ok(DecodedPhoto {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

pub type PhotoSet = HashMap<PhotoRef, DecodedPhoto>;

#[derive(Clone)]
pub struct ImageLoader {
    client: Client,
    allow_remote: bool,
}

impl ImageLoader {
    pub fn new(allow_remote: bool, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client for remote images")?,
            allow_remote,
        })
    }

    pub async fn load(
        &self,
        photo: &PhotoRef,
        session: &EditorSession,
    ) -> Result<DecodedPhoto, ImageError> {
        let bytes = match photo {
            PhotoRef::Local { handle } => session
                .photo(*handle)
                .map(|stored| stored.bytes)
                .ok_or_else(|| ImageError::MissingUpload(handle.to_string()))?,
            PhotoRef::Remote { url } => self.fetch(url).await?,
        };
        // Decoding a large JPEG is CPU work; keep it off the async workers.
        tokio::task::spawn_blocking(move || DecodedPhoto::decode(&bytes)).await?
    }

    /// Loads every distinct photo, skipping (with a warning) those that fail.
    pub async fn load_all<'a>(
        &self,
        photos: impl IntoIterator<Item = &'a PhotoRef>,
        session: &EditorSession,
    ) -> PhotoSet {
        let mut loaded = PhotoSet::new();
        for photo in photos {
            if loaded.contains_key(photo) {
                continue;
            }
            match self.load(photo, session).await {
                Ok(decoded) => {
                    debug!(?photo, width = decoded.width, height = decoded.height, "Photo loaded");
                    loaded.insert(photo.clone(), decoded);
                }
                Err(e) => warn!(?photo, "Photo omitted from export: {e}"),
            }
        }
        loaded
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError> {
        if !self.allow_remote {
            return Err(ImageError::RemoteDisabled);
        }
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?)
    }
}
