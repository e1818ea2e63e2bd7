// Persistence collaborators: local snapshot durability, the request document
// store and the blob store holding uploaded file contents.

pub mod blobs;
pub mod documents;
pub mod local;
pub mod uploads;

use thiserror::Error;

pub use blobs::{blob_key, BlobStore, FileSystemBlobStore};
pub use documents::{
    publish_snapshot, pull_snapshot, FileDocumentStore, RequestRepository, StoredDocument,
};
pub use local::{LocalSnapshotStore, SnapshotStore, StoredSnapshot, SCHEMA_VERSION};
pub use uploads::commit_pending_files;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },

    #[error("Upload of file {file_id} failed: {reason}")]
    Upload { file_id: String, reason: String },

    #[error("Request not found: {id}")]
    NotFound { id: String },
}
