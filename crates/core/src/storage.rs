//! Blob storage for file attachments.
//!
//! File metadata lives in the database; the bytes live behind a
//! [`BlobStore`]. The only backend shipped is [`LocalBlobStore`], which keeps
//! blobs under a root directory on the local filesystem.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::attachments::sanitize_file_name;
use crate::error::CoreError;
use crate::types::DbId;

/// Key-addressed byte storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing anything already there.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), CoreError>;

    /// Read the blob stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CoreError>;

    /// Remove the blob under `key`. Removing a missing blob is not an error.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Build a unique storage key for a new upload: `{item_id}/{uuid}-{name}`.
pub fn storage_key(item_id: DbId, original_name: &str) -> String {
    format!(
        "{item_id}/{}-{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(original_name)
    )
}

/// Filesystem-backed [`BlobStore`].
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path under the root. Keys must be relative and may
    /// not climb out of the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, CoreError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(CoreError::Validation(format!("Invalid storage key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), CoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Internal(format!("Failed to create blob directory: {e}")))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write blob '{key}': {e}")))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CoreError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read blob '{key}': {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to delete blob '{key}': {e}"
            ))),
        }
    }
}
