//! File storage for ingested images
//!
//! Files are stored under a random name in a logical area and exposed through
//! a public base URL.

use std::path::{Path, PathBuf};
use url::Url;
use tracing::debug;
use crate::utils::errors::{LiraError, Result};
use crate::utils::helpers::random_file_name;

/// Logical storage namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Identity documents sent for account verification
    Verification,
    /// Proof-of-payment images of conversion requests
    Requests,
}

impl StorageArea {
    pub fn directory(&self) -> &'static str {
        match self {
            StorageArea::Verification => "members/verification",
            StorageArea::Requests => "images/requests",
        }
    }
}

/// A persisted file
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Path relative to the storage root, e.g. `images/requests/ab12.jpg`
    pub relative_path: String,
    pub public_url: String,
}

#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Copy `source` into `area` under a random name with `extension`
    async fn store(&self, area: StorageArea, source: &Path, extension: &str) -> Result<StoredFile>;
    async fn delete(&self, relative_path: &str) -> Result<()>;
}

/// Public disk: files under `root`, served at `public_base_url`
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    base_url: Url,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with '/'
        let base = if public_base_url.ends_with('/') {
            public_base_url.to_string()
        } else {
            format!("{}/", public_base_url)
        };

        Ok(Self {
            root: root.into(),
            base_url: Url::parse(&base)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalDiskStorage {
    async fn store(&self, area: StorageArea, source: &Path, extension: &str) -> Result<StoredFile> {
        let directory = self.root.join(area.directory());
        tokio::fs::create_dir_all(&directory).await.map_err(|e| {
            LiraError::Storage(format!("cannot create {}: {}", directory.display(), e))
        })?;

        let name = random_file_name(extension);
        let destination = directory.join(&name);
        tokio::fs::copy(source, &destination).await.map_err(|e| {
            LiraError::Storage(format!("cannot write {}: {}", destination.display(), e))
        })?;

        let relative_path = format!("{}/{}", area.directory(), name);
        let public_url = self.base_url.join(&relative_path)?.to_string();
        debug!(path = %relative_path, url = %public_url, "File stored");

        Ok(StoredFile { relative_path, public_url })
    }

    async fn delete(&self, relative_path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.root.join(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
