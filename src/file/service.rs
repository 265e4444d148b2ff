//! File custody: upload, list, download and delete.
//!
//! Keeps metadata records and on-disk blobs aligned. Raw filesystem paths
//! never leave this module; callers only see file IDs and filenames.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use super::metadata::{FileEntry, FileRecord, FileRepository, NewFileRecord};
use super::naming::{candidate_name, sanitize_file_id, sanitize_filename};
use super::storage::FileStorage;
use crate::datetime::to_rfc3339;
use crate::logging::AUDIT_TARGET;
use crate::{CloudboxError, Database, Result};

/// Upper bound on conflict-resolution attempts per upload.
pub const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Attribution shown for the requester's own files.
pub const OWN_FILE_LABEL: &str = "Me";

/// Attribution shown when the uploader account no longer exists.
pub const UNKNOWN_UPLOADER: &str = "unknown";

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    pub size: i64,
    pub is_shared: bool,
}

/// One row of a file listing.
#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub id: String,
    pub filename: String,
    pub size: i64,
    pub is_shared: bool,
    /// RFC3339 upload time.
    pub uploaded_at: String,
    /// "Me", the uploader's username, or "unknown".
    pub uploaded_by: String,
}

impl FileListing {
    fn from_entry(entry: FileEntry, requester_id: &str) -> Self {
        let uploaded_by = if entry.user_id == requester_id {
            OWN_FILE_LABEL.to_string()
        } else {
            entry
                .uploader_name
                .unwrap_or_else(|| UNKNOWN_UPLOADER.to_string())
        };
        Self {
            id: entry.id,
            filename: entry.filename,
            size: entry.size,
            is_shared: entry.is_shared,
            uploaded_at: to_rfc3339(&entry.uploaded_at),
            uploaded_by,
        }
    }
}

/// A downloaded file.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// File service shared by all request handlers.
#[derive(Debug, Clone)]
pub struct FileService {
    db: Database,
    storage: FileStorage,
    max_upload_bytes: u64,
}

impl FileService {
    pub fn new(db: Database, storage: FileStorage, max_upload_bytes: u64) -> Self {
        Self {
            db,
            storage,
            max_upload_bytes,
        }
    }

    /// Largest accepted upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Store a file in the owner's personal namespace or the shared one.
    ///
    /// If the name is taken, `(n)` is inserted before the extension until a
    /// free name is found.
    pub async fn upload(
        &self,
        owner_id: &str,
        is_shared: bool,
        content: &[u8],
        declared_filename: &str,
    ) -> Result<UploadedFile> {
        let filename = sanitize_filename(declared_filename)?;
        if content.len() as u64 > self.max_upload_bytes {
            return Err(CloudboxError::Validation(format!(
                "file exceeds the upload limit of {} bytes",
                self.max_upload_bytes
            )));
        }

        let dir = self.storage.target_dir(owner_id, is_shared);
        let staged = self.storage.stage(&dir, content).await.map_err(|e| {
            error!("Failed to stage upload in {:?}: {}", dir, e);
            CloudboxError::UploadFailed("could not write file".to_string())
        })?;

        let record = match self
            .reserve_name(owner_id, is_shared, &filename, content.len() as i64, &dir)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!(
                    staged = %staged.display(),
                    "Failed to record upload; staged blob left for reconciliation: {}", e
                );
                return Err(match e {
                    CloudboxError::UploadFailed(_) => e,
                    _ => CloudboxError::UploadFailed("could not record file".to_string()),
                });
            }
        };

        let final_path = PathBuf::from(&record.path);
        if let Err(e) = self.storage.finalize(&staged, &final_path).await {
            error!(
                staged = %staged.display(),
                "Failed to move staged upload to {:?}: {}", final_path, e
            );
            if let Err(e) = self.storage.remove(&staged).await {
                error!(staged = %staged.display(), "Failed to remove staged upload: {}", e);
            }
            if let Err(e) = FileRepository::new(self.db.pool())
                .delete_by_id(&record.id)
                .await
            {
                error!(file_id = %record.id, "Failed to remove record of failed upload: {}", e);
            }
            return Err(CloudboxError::UploadFailed("could not store file".to_string()));
        }

        info!(
            target: AUDIT_TARGET,
            user_id = %owner_id,
            file_id = %record.id,
            filename = %record.filename,
            size = record.size,
            is_shared,
            "file uploaded"
        );

        Ok(UploadedFile {
            id: record.id,
            filename: record.filename,
            size: record.size,
            is_shared: record.is_shared,
        })
    }

    /// Insert the record under the first free candidate name.
    async fn reserve_name(
        &self,
        owner_id: &str,
        is_shared: bool,
        filename: &str,
        size: i64,
        dir: &Path,
    ) -> Result<FileRecord> {
        let files = FileRepository::new(self.db.pool());

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = candidate_name(filename, attempt);
            let new_file = NewFileRecord {
                user_id: owner_id.to_string(),
                path: dir.join(&candidate).to_string_lossy().into_owned(),
                filename: candidate,
                size,
                is_shared,
            };
            if let Some(record) = files.insert(&new_file).await? {
                return Ok(record);
            }
        }

        Err(CloudboxError::UploadFailed(format!(
            "no free name for {filename} after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }

    /// List the requester's personal files or all shared files.
    pub async fn list(
        &self,
        requester_id: &str,
        is_shared: bool,
        keyword: Option<&str>,
    ) -> Result<Vec<FileListing>> {
        let entries = FileRepository::new(self.db.pool())
            .list(requester_id, is_shared, keyword)
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| FileListing::from_entry(entry, requester_id))
            .collect())
    }

    /// Fetch a file's content.
    ///
    /// Another user's personal file is reported as not found.
    pub async fn download(&self, file_id: &str, requester_id: &str) -> Result<FileDownload> {
        let file_id = sanitize_file_id(file_id)?;

        let record = FileRepository::new(self.db.pool())
            .get_visible(file_id, requester_id)
            .await?
            .ok_or_else(|| CloudboxError::NotFound("file".to_string()))?;

        match self.storage.read(Path::new(&record.path)).await? {
            Some(content) => Ok(FileDownload {
                filename: record.filename,
                content,
            }),
            None => {
                error!(
                    file_id = %record.id,
                    path = %record.path,
                    "File record exists but blob is missing"
                );
                Err(CloudboxError::NotFound("file".to_string()))
            }
        }
    }

    /// Delete a file and its record.
    ///
    /// Shared files may be deleted by any user; personal files only by
    /// their owner.
    pub async fn delete(&self, file_id: &str, requester_id: &str) -> Result<()> {
        let file_id = sanitize_file_id(file_id)?;
        let storage = &self.storage;

        let record = FileRepository::new(self.db.pool())
            .delete_visible(file_id, requester_id, |path| async move {
                if !storage.remove(&path).await? {
                    warn!(path = %path.display(), "Blob already missing; removing record");
                }
                Ok::<(), CloudboxError>(())
            })
            .await?
            .ok_or_else(|| CloudboxError::NotFound("file".to_string()))?;

        info!(
            target: AUDIT_TARGET,
            user_id = %requester_id,
            file_id = %record.id,
            filename = %record.filename,
            owner_id = %record.user_id,
            is_shared = record.is_shared,
            "file deleted"
        );
        Ok(())
    }
}
