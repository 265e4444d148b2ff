//! On-disk blob storage for CloudBox.
//!
//! Layout:
//! ```text
//! {files_dir}/
//! └── {owner_id}/
//!     └── report.txt
//! {shared_dir}/
//! └── notes.md
//! ```
//!
//! Uploads are first written under a unique staging name inside the target
//! directory and only renamed to their final name once the metadata record
//! has reserved that name.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::Result;

/// Prefix of staged upload files.
pub const STAGING_PREFIX: &str = ".upload-";

/// Blob storage rooted at the personal and shared directories.
#[derive(Debug, Clone)]
pub struct FileStorage {
    files_dir: PathBuf,
    shared_dir: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage.
    ///
    /// Both base directories are created if they don't exist.
    pub fn new(files_dir: impl Into<PathBuf>, shared_dir: impl Into<PathBuf>) -> Result<Self> {
        let files_dir = files_dir.into();
        let shared_dir = shared_dir.into();
        std::fs::create_dir_all(&files_dir)?;
        std::fs::create_dir_all(&shared_dir)?;

        Ok(Self {
            files_dir,
            shared_dir,
        })
    }

    /// Base directory for personal files.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Directory for shared files.
    pub fn shared_dir(&self) -> &Path {
        &self.shared_dir
    }

    /// Directory an upload lands in.
    pub fn target_dir(&self, owner_id: &str, is_shared: bool) -> PathBuf {
        if is_shared {
            self.shared_dir.clone()
        } else {
            self.files_dir.join(owner_id)
        }
    }

    /// Write content to a new staging file in `dir`, creating `dir` if needed.
    pub async fn stage(&self, dir: &Path, content: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{STAGING_PREFIX}{}.part", Uuid::new_v4()));
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        Ok(path)
    }

    /// Move a staged file to its final path.
    pub async fn finalize(&self, staged: &Path, final_path: &Path) -> Result<()> {
        fs::rename(staged, final_path).await?;
        Ok(())
    }

    /// Read a blob. Returns `None` if it doesn't exist.
    pub async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub async fn remove(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
