use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::PersistenceError;
use crate::fs::FileSystemOperations;
use crate::workflows::{Department, LabelRequest, WorkflowSnapshot};

/// Capacity of the change feed; slow subscribers skip to the latest list.
const SUBSCRIPTION_CAPACITY: usize = 16;

/// A request copy as kept by the document store, with write stamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    #[serde(flatten)]
    pub request: LabelRequest,
    pub stored_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document store holding one record per request copy
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a new request document
    async fn save_request(&self, request: &LabelRequest) -> Result<(), PersistenceError>;

    /// Overwrite an existing request document
    async fn update_request(&self, request: &LabelRequest) -> Result<(), PersistenceError>;

    async fn get_request(&self, id: &str) -> Result<Option<LabelRequest>, PersistenceError>;

    /// All requests, most recently created first
    async fn list_requests(&self) -> Result<Vec<LabelRequest>, PersistenceError>;

    /// Feed of the full ordered list, sent after every write
    fn subscribe(&self) -> broadcast::Receiver<Vec<LabelRequest>>;
}

/// Document store backed by one JSON file per request copy
pub struct FileDocumentStore {
    fs: Arc<dyn FileSystemOperations>,
    dir: PathBuf,
    changes: broadcast::Sender<Vec<LabelRequest>>,
}

impl FileDocumentStore {
    pub fn new(fs: Arc<dyn FileSystemOperations>, dir: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);
        Self {
            fs,
            dir: dir.into(),
            changes,
        }
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read_document(&self, id: &str) -> Result<Option<StoredDocument>, PersistenceError> {
        let path = self.document_path(id);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let contents = self.fs.read(&path).await?;
        Ok(Some(serde_json::from_slice(&contents)?))
    }

    async fn write_document(&self, document: &StoredDocument) -> Result<(), PersistenceError> {
        self.fs.create_dir_all(&self.dir).await?;
        let serialized = serde_json::to_vec_pretty(document)?;
        self.fs
            .write_atomic(&self.document_path(&document.request.id), &serialized)
            .await?;
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<StoredDocument>, PersistenceError> {
        if !self.fs.exists(&self.dir) {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for path in self.fs.list_files(&self.dir).await? {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = self.fs.read(&path).await?;
            documents.push(serde_json::from_slice::<StoredDocument>(&contents)?);
        }

        documents.sort_by(|a, b| {
            b.stored_at
                .cmp(&a.stored_at)
                .then_with(|| b.request.created_at.cmp(&a.request.created_at))
        });
        Ok(documents)
    }

    async fn broadcast_changes(&self) -> Result<(), PersistenceError> {
        // No receivers is not an error; nobody is listening yet.
        if self.changes.receiver_count() > 0 {
            let requests = self.list_requests().await?;
            let _ = self.changes.send(requests);
        }
        Ok(())
    }
}

#[async_trait]
impl RequestRepository for FileDocumentStore {
    async fn save_request(&self, request: &LabelRequest) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let document = StoredDocument {
            request: request.clone(),
            stored_at: now,
            updated_at: now,
        };
        self.write_document(&document).await?;
        debug!(request_id = %request.id, department = %request.department, "Request document stored");
        self.broadcast_changes().await
    }

    async fn update_request(&self, request: &LabelRequest) -> Result<(), PersistenceError> {
        let Some(existing) = self.read_document(&request.id).await? else {
            return Err(PersistenceError::NotFound {
                id: request.id.clone(),
            });
        };
        let document = StoredDocument {
            request: request.clone(),
            stored_at: existing.stored_at,
            updated_at: Utc::now(),
        };
        self.write_document(&document).await?;
        debug!(request_id = %request.id, "Request document updated");
        self.broadcast_changes().await
    }

    async fn get_request(&self, id: &str) -> Result<Option<LabelRequest>, PersistenceError> {
        Ok(self.read_document(id).await?.map(|d| d.request))
    }

    async fn list_requests(&self) -> Result<Vec<LabelRequest>, PersistenceError> {
        Ok(self
            .list_documents()
            .await?
            .into_iter()
            .map(|d| d.request)
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<LabelRequest>> {
        self.changes.subscribe()
    }
}

/// Write every copy in the snapshot, inserting new ones and updating the rest.
///
/// Returns (inserted, updated).
pub async fn publish_snapshot(
    repository: &dyn RequestRepository,
    snapshot: &WorkflowSnapshot,
) -> Result<(usize, usize), PersistenceError> {
    let mut inserted = 0;
    let mut updated = 0;

    // Oldest first so that the newest copies get the latest store stamps.
    for request in snapshot.requests.iter().rev() {
        match repository.get_request(&request.id).await? {
            Some(existing) if &existing == request => {}
            Some(_) => {
                repository.update_request(request).await?;
                updated += 1;
            }
            None => {
                repository.save_request(request).await?;
                inserted += 1;
            }
        }
    }

    info!(inserted, updated, "Snapshot published to document store");
    Ok((inserted, updated))
}

/// Rebuild a snapshot from the document store, newest copies first.
pub async fn pull_snapshot(
    repository: &dyn RequestRepository,
    current_department: Department,
) -> Result<WorkflowSnapshot, PersistenceError> {
    let requests = repository.list_requests().await?;
    debug!(requests = requests.len(), "Snapshot pulled from document store");
    Ok(WorkflowSnapshot {
        current_department,
        requests,
    })
}
