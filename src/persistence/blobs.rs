use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use super::PersistenceError;
use crate::fs::FileSystemOperations;

/// Storage key of a file's contents.
pub fn blob_key(request_id: &str, file_id: &str) -> String {
    format!("files/{request_id}/{file_id}")
}

/// Durable storage for uploaded file contents
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `contents` under `key` and return the durable URL
    async fn upload(&self, key: &str, contents: Vec<u8>) -> Result<String, PersistenceError>;
}

/// Blob store rooted in a local directory, handing out `file://` URLs
pub struct FileSystemBlobStore {
    fs: Arc<dyn FileSystemOperations>,
    root: PathBuf,
}

impl FileSystemBlobStore {
    pub fn new(fs: Arc<dyn FileSystemOperations>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }
}

#[async_trait]
impl BlobStore for FileSystemBlobStore {
    async fn upload(&self, key: &str, contents: Vec<u8>) -> Result<String, PersistenceError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent).await?;
        }
        self.fs.write(&path, &contents).await?;

        debug!(key = %key, bytes = contents.len(), "Blob stored");
        Ok(format!("file://{}", path.display()))
    }
}
