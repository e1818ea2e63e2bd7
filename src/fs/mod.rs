//! File system operations abstraction for testing
//!
//! The persistence layer reads pending uploads and writes snapshots,
//! documents and blobs through this trait so that it can be mocked with
//! the `mockall` crate in tests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use labelflow::fs::{FileSystemOperations, StandardFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
//!
//!     fs_ops.create_dir_all(Path::new(".labelflow/blobs")).await?;
//!     fs_ops.write(Path::new(".labelflow/blobs/proof.pdf"), b"%PDF-1.7").await?;
//!
//!     let bytes = fs_ops.read(Path::new(".labelflow/blobs/proof.pdf")).await?;
//!     assert_eq!(bytes, b"%PDF-1.7");
//!     Ok(())
//! }
//! ```
use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read a whole file into memory
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write data to a file, creating the file if it doesn't exist
    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Write through a sibling temporary file and rename it into place
    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// List the regular files directly inside a directory
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;
}

/// Standard implementation that uses actual file system operations
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(Into::into)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let temp_file = PathBuf::from(format!("{}.tmp", path.display()));
        tokio::fs::write(&temp_file, contents).await?;
        tokio::fs::rename(&temp_file, path).await?;
        Ok(())
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");
        let fs_ops = StandardFileSystem;

        fs_ops.write_atomic(&path, b"first").await.unwrap();
        fs_ops.write_atomic(&path, b"second").await.unwrap();

        assert_eq!(fs_ops.read(&path).await.unwrap(), b"second");
        assert!(!fs_ops.exists(&temp_dir.path().join("snapshot.json.tmp")));
    }

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let fs_ops = StandardFileSystem;
        fs_ops
            .create_dir_all(&temp_dir.path().join("nested"))
            .await
            .unwrap();
        fs_ops
            .write(&temp_dir.path().join("b.json"), b"{}")
            .await
            .unwrap();
        fs_ops
            .write(&temp_dir.path().join("a.json"), b"{}")
            .await
            .unwrap();

        let files = fs_ops.list_files(temp_dir.path()).await.unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_missing_file_read_fails() {
        let temp_dir = TempDir::new().unwrap();
        let fs_ops = StandardFileSystem;

        tokio_test::block_on(async {
            let missing = temp_dir.path().join("gone.pdf");
            assert!(!fs_ops.exists(&missing));
            assert!(fs_ops.read(&missing).await.is_err());
        });
    }
}
