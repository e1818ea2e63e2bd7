use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::PersistenceError;
use crate::fs::FileSystemOperations;
use crate::workflows::{Department, WorkflowSnapshot};

/// Version of the stored snapshot layout. Anything older is discarded on load.
pub const SCHEMA_VERSION: u32 = 2;

/// On-disk envelope around a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub version: u32,
    pub state: WorkflowSnapshot,
}

#[derive(Debug, Deserialize)]
struct VersionHeader {
    #[serde(default)]
    version: u32,
}

/// Trait for local snapshot durability
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot, or defaults when there is nothing usable
    async fn load(&self) -> Result<WorkflowSnapshot, PersistenceError>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &WorkflowSnapshot) -> Result<(), PersistenceError>;
}

/// Snapshot kept as a single JSON file named after the storage key
pub struct LocalSnapshotStore {
    fs: Arc<dyn FileSystemOperations>,
    dir: PathBuf,
    storage_key: String,
    default_department: Department,
}

impl LocalSnapshotStore {
    pub fn new(
        fs: Arc<dyn FileSystemOperations>,
        dir: impl Into<PathBuf>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            dir: dir.into(),
            storage_key: storage_key.into(),
            default_department: Department::Marketing,
        }
    }

    pub fn with_default_department(mut self, department: Department) -> Self {
        self.default_department = department;
        self
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.storage_key))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", self.storage_key))
    }

    fn defaults(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            current_department: self.default_department,
            requests: Vec::new(),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn load(&self) -> Result<WorkflowSnapshot, PersistenceError> {
        let path = self.snapshot_path();
        if !self.fs.exists(&path) {
            info!(file = ?path, "No stored snapshot found, starting empty");
            return Ok(self.defaults());
        }

        let contents = self.fs.read(&path).await?;
        let header: VersionHeader = serde_json::from_slice(&contents)?;

        if header.version < SCHEMA_VERSION {
            warn!(
                found = header.version,
                expected = SCHEMA_VERSION,
                "Stored snapshot uses an older schema, resetting to defaults"
            );
            return Ok(self.defaults());
        }
        if header.version > SCHEMA_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found: header.version,
            });
        }

        let stored: StoredSnapshot = serde_json::from_slice(&contents)?;
        debug!(
            file = ?path,
            requests = stored.state.requests.len(),
            "Snapshot loaded"
        );
        Ok(stored.state)
    }

    async fn save(&self, snapshot: &WorkflowSnapshot) -> Result<(), PersistenceError> {
        self.fs.create_dir_all(&self.dir).await?;

        // The advisory lock needs a real file descriptor, so the lock file is
        // opened directly rather than through FileSystemOperations.
        let lock_path = self.lock_path();
        let lock_file = tokio::task::spawn_blocking(move || {
            OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(lock_path)
        })
        .await
        .map_err(|e| PersistenceError::Lock {
            reason: e.to_string(),
        })?
        .map_err(|e| PersistenceError::Lock {
            reason: e.to_string(),
        })?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.try_write().map_err(|e| PersistenceError::Lock {
            reason: format!("snapshot is being written by another process: {e}"),
        })?;

        let stored = StoredSnapshot {
            version: SCHEMA_VERSION,
            state: snapshot.clone(),
        };
        let serialized = serde_json::to_vec_pretty(&stored)?;
        let path = self.snapshot_path();
        self.fs.write_atomic(&path, &serialized).await?;

        debug!(
            file = ?path,
            requests = snapshot.requests.len(),
            "Snapshot saved"
        );
        Ok(())
    }
}
