// Second phase of a file upload: push locally referenced contents to the
// blob store and swap the pending reference for the durable URL.

use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info};

use super::blobs::{blob_key, BlobStore};
use super::PersistenceError;
use crate::fs::FileSystemOperations;
use crate::observability::workflow_metrics;
use crate::workflows::{FileLocation, WorkflowSnapshot};

/// Commit every pending file in the snapshot, returning how many were uploaded.
///
/// Copies of a request share file records, so each file id is uploaded once
/// and the resulting URL is applied to every copy carrying it. A file already
/// committed in some copy reuses that URL instead of being uploaded again.
/// Uploading stops at the first failure, but every URL obtained before it is
/// still applied to all copies and nothing is rolled back.
pub async fn commit_pending_files(
    snapshot: &mut WorkflowSnapshot,
    fs: &dyn FileSystemOperations,
    blobs: &dyn BlobStore,
) -> Result<usize, PersistenceError> {
    let mut committed: HashMap<String, String> = HashMap::new();
    for file in snapshot.requests.iter().flat_map(|r| r.files.iter()) {
        if let FileLocation::Committed { url } = &file.location {
            committed
                .entry(file.id.clone())
                .or_insert_with(|| url.clone());
        }
    }

    // (request id, file id, local ref) for each distinct file still to upload.
    let mut queue: Vec<(String, String, String)> = Vec::new();
    for request in &snapshot.requests {
        for file in &request.files {
            let FileLocation::Pending { local_ref } = &file.location else {
                continue;
            };
            let queued = queue.iter().any(|(_, id, _)| id == &file.id);
            if !queued && !committed.contains_key(&file.id) {
                queue.push((request.id.clone(), file.id.clone(), local_ref.clone()));
            }
        }
    }

    let mut uploaded = 0;
    let mut failure = None;
    for (request_id, file_id, local_ref) in queue {
        match upload_one(fs, blobs, &request_id, &file_id, &local_ref).await {
            Ok(url) => {
                committed.insert(file_id, url);
                uploaded += 1;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    for file in snapshot
        .requests
        .iter_mut()
        .flat_map(|r| r.files.iter_mut())
        .filter(|f| f.location.is_pending())
    {
        if let Some(url) = committed.get(&file.id) {
            file.location = FileLocation::Committed { url: url.clone() };
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }
    if uploaded > 0 {
        info!(uploaded, "Pending files committed to blob store");
    }
    Ok(uploaded)
}

async fn upload_one(
    fs: &dyn FileSystemOperations,
    blobs: &dyn BlobStore,
    request_id: &str,
    file_id: &str,
    local_ref: &str,
) -> Result<String, PersistenceError> {
    let metrics = workflow_metrics();

    let contents = match fs.read(Path::new(local_ref)).await {
        Ok(contents) => contents,
        Err(e) => {
            metrics.record_upload_failure();
            error!(file_id = %file_id, local_ref = %local_ref, error = %e, "Pending file unreadable");
            return Err(PersistenceError::Upload {
                file_id: file_id.to_string(),
                reason: e.to_string(),
            });
        }
    };

    match blobs.upload(&blob_key(request_id, file_id), contents).await {
        Ok(url) => {
            metrics.record_upload_committed();
            Ok(url)
        }
        Err(e) => {
            metrics.record_upload_failure();
            error!(file_id = %file_id, error = %e, "Blob upload failed");
            Err(PersistenceError::Upload {
                file_id: file_id.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
