//! Image ingestion pipeline
//!
//! Turns the media of an inbound message into a stored, publicly reachable
//! image. Photos are accepted as they come; documents are checked by MIME
//! type and file name, and every download is probed by signature before it
//! is persisted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use image::ImageFormat;
use tracing::{debug, info, warn};
use crate::telegram::{DocumentRef, MediaVariant, PhotoVariant, UpdateSource};
use crate::utils::errors::{LiraError, Result};
use super::storage::{FileStorage, StorageArea};

/// Declared MIME types accepted without a download
const IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/x-ms-bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("image/svg+xml", "svg"),
];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "svg"];

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedImage {
    pub relative_path: String,
    pub url: String,
    pub extension: String,
}

/// What the message metadata says about a candidate file
#[derive(Debug, Clone, PartialEq)]
enum Candidate {
    /// Known to be an image; extension is a first guess
    Image { file_id: String, extension: String },
    /// Must be downloaded and probed before deciding
    Unverified { file_id: String },
}

/// Pick the variant with the most detail: byte size, then pixel count, then the last one
pub fn select_photo(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    if let Some(largest) = variants
        .iter()
        .filter(|v| v.file_size.is_some())
        .max_by_key(|v| v.file_size)
    {
        return Some(largest);
    }

    variants
        .iter()
        .filter(|v| v.width > 0 && v.height > 0)
        .max_by_key(|v| v.width as u64 * v.height as u64)
        .or_else(|| variants.last())
}

/// Extension for a document whose MIME type or file name marks it as an image
pub fn document_image_extension(document: &DocumentRef) -> Option<String> {
    if let Some(mime) = document.mime_type.as_deref() {
        let mime = mime.trim().to_ascii_lowercase();
        if let Some((_, ext)) = IMAGE_MIME_TYPES.iter().find(|(m, _)| *m == mime) {
            return Some(ext.to_string());
        }
    }

    let extension = document
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())?;

    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then(|| match extension.as_str() {
            "jpeg" => "jpg".to_string(),
            "tif" => "tiff".to_string(),
            _ => extension,
        })
}

/// Detect the image type of `bytes` by signature
pub fn probe_extension(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some("png"),
        Ok(ImageFormat::Jpeg) => Some("jpg"),
        Ok(ImageFormat::Gif) => Some("gif"),
        Ok(ImageFormat::WebP) => Some("webp"),
        Ok(ImageFormat::Bmp) => Some("bmp"),
        Ok(ImageFormat::Tiff) => Some("tiff"),
        _ if looks_like_svg(bytes) => Some("svg"),
        _ => None,
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn candidate_for(media: Option<&MediaVariant>) -> Result<Candidate> {
    match media {
        Some(MediaVariant::Photo(variants)) => {
            let photo = select_photo(variants).ok_or(LiraError::NoImageFound)?;
            Ok(Candidate::Image {
                file_id: photo.file_id.clone(),
                extension: "jpg".to_string(),
            })
        }
        Some(MediaVariant::Document(document)) => Ok(match document_image_extension(document) {
            Some(extension) => Candidate::Image {
                file_id: document.file_id.clone(),
                extension,
            },
            None => Candidate::Unverified {
                file_id: document.file_id.clone(),
            },
        }),
        Some(MediaVariant::Other) | None => Err(LiraError::NoImageFound),
    }
}

/// Downloads, validates and stores images sent by members
#[derive(Clone)]
pub struct ImageIngestor {
    source: Arc<dyn UpdateSource>,
    storage: Arc<dyn FileStorage>,
    temp_dir: PathBuf,
}

impl ImageIngestor {
    pub fn new(source: Arc<dyn UpdateSource>, storage: Arc<dyn FileStorage>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            storage,
            temp_dir: temp_dir.into(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn FileStorage> {
        &self.storage
    }

    /// Ingest the image carried by `media` into `area`.
    ///
    /// Fails with `NoImageFound` when there is nothing image-like to fetch and
    /// with `InvalidImage` when the downloaded bytes are not an image. The
    /// scratch download is removed on every path.
    pub async fn ingest(&self, media: Option<&MediaVariant>, area: StorageArea) -> Result<IngestedImage> {
        let candidate = candidate_for(media)?;
        let (file_id, declared) = match &candidate {
            Candidate::Image { file_id, extension } => (file_id.as_str(), Some(extension.as_str())),
            Candidate::Unverified { file_id } => (file_id.as_str(), None),
        };

        let remote = self.source.get_file(file_id).await?;
        let local = self.source.download_file(&remote, &self.temp_dir).await?;
        debug!(file_id = file_id, path = %local.display(), "Media downloaded");

        let result = self.persist(&local, declared, area).await;
        if let Err(e) = tokio::fs::remove_file(&local).await {
            warn!(path = %local.display(), error = %e, "Failed to remove scratch download");
        }
        result
    }

    async fn persist(&self, local: &Path, declared: Option<&str>, area: StorageArea) -> Result<IngestedImage> {
        let bytes = tokio::fs::read(local).await?;
        let extension = match probe_extension(&bytes) {
            Some(detected) => detected,
            None => {
                return Err(LiraError::InvalidImage(format!(
                    "signature probe failed (declared {})",
                    declared.unwrap_or("unknown")
                )));
            }
        };

        if let Some(declared) = declared.filter(|d| *d != extension) {
            info!(declared = declared, detected = extension, "Using detected image type");
        }

        let stored = self.storage.store(area, local, extension).await?;
        Ok(IngestedImage {
            relative_path: stored.relative_path,
            url: stored.public_url,
            extension: extension.to_string(),
        })
    }
}
