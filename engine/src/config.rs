//! Client configuration loaded from environment variables.

use crate::storage::{FileStorage, StorageError};
use std::env;
use std::path::PathBuf;

/// Directory used for [`FileStorage`] when `MCCOY_STORAGE_DIR` is unset.
pub const DEFAULT_STORAGE_DIR: &str = ".mccoy";

/// Where tour images are served from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Object storage project URL, without the `/storage/v1` suffix
    pub storage_url: Option<String>,
    /// Public bucket holding tour images
    pub bucket: Option<String>,
}

impl CatalogConfig {
    pub fn new(storage_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            storage_url: Some(storage_url.into()),
            bucket: Some(bucket.into()),
        }
    }

    /// Base URL for public objects, e.g. `https://x.example/storage/v1/object/public`.
    pub fn public_base(&self) -> Option<String> {
        let url = self.storage_url.as_deref()?.trim_end_matches('/');
        if url.is_empty() {
            return None;
        }
        Some(format!("{}/storage/v1/object/public", url))
    }

    /// Bucket name with surrounding slashes removed; `None` if blank.
    pub fn bucket_segment(&self) -> Option<&str> {
        self.bucket
            .as_deref()
            .map(|b| b.trim_matches('/'))
            .filter(|b| !b.is_empty())
    }
}

/// Everything a client host needs to wire up the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root directory for device-local storage
    pub storage_dir: PathBuf,
    pub catalog: CatalogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_dir = non_blank("MCCOY_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        Self {
            storage_dir,
            catalog: CatalogConfig {
                storage_url: non_blank("MCCOY_STORAGE_URL"),
                bucket: non_blank("MCCOY_STORAGE_BUCKET"),
            },
        }
    }

    /// Open the file-backed medium under `storage_dir`.
    pub fn open_storage(&self) -> Result<FileStorage, StorageError> {
        FileStorage::open(&self.storage_dir)
    }
}
