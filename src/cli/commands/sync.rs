use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use super::Session;
use crate::fs::{FileSystemOperations, StandardFileSystem};
use crate::observability::{workflow_metrics, OperationTimer};
use crate::persistence::{
    commit_pending_files, publish_snapshot, pull_snapshot, FileDocumentStore, FileSystemBlobStore,
};

/// Upload pending files, publish every copy to the document store, then
/// adopt the store's list so changes written by others arrive locally
pub struct SyncCommand;

impl SyncCommand {
    pub async fn execute(&self, session: &mut Session) -> Result<()> {
        let timer = OperationTimer::new("sync");
        let data_dir = session.config.storage.data_dir.clone();
        let fs: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
        let blobs = FileSystemBlobStore::new(fs.clone(), data_dir.join("blobs"));
        let documents = FileDocumentStore::new(fs.clone(), data_dir.join("requests"));

        println!("📤 Uploading pending files...");
        let mut snapshot = session.state.snapshot().clone();
        let committed = commit_pending_files(&mut snapshot, fs.as_ref(), &blobs).await;

        // Whatever made it to the blob store stays committed, even on failure.
        session.state.replace_snapshot(snapshot);
        session.save().await?;
        let uploaded = match committed {
            Ok(uploaded) => uploaded,
            Err(e) => {
                warn!(error = %e, "Sync stopped before publishing");
                return Err(e.into());
            }
        };
        println!("   {uploaded} files uploaded");

        println!("🗂️  Publishing requests...");
        let (inserted, updated) = publish_snapshot(&documents, session.state.snapshot()).await?;
        println!("   {inserted} new, {updated} updated");

        println!("📥 Pulling requests...");
        let current_department = session.state.snapshot().current_department;
        let before = session.state.snapshot().len();
        session
            .state
            .replace_snapshot(pull_snapshot(&documents, current_department).await?);
        session.save().await?;
        let after = session.state.snapshot().len();
        println!("   {after} requests ({} from elsewhere)", after.saturating_sub(before));

        workflow_metrics().log_stats();
        timer.finish();
        Ok(())
    }
}
