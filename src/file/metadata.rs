//! File metadata records and repository.

use std::future::Future;
use std::path::PathBuf;

use uuid::Uuid;

use crate::db::{is_unique_violation, DbPool};
use crate::{CloudboxError, Result};

const RECORD_COLUMNS: &str = "id, user_id, filename, size, path, is_shared, uploaded_at";

/// Metadata for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// File ID (UUID v4).
    pub id: String,
    /// Uploader's user ID.
    pub user_id: String,
    /// Stored filename after conflict resolution.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
    /// Path of the blob on disk.
    pub path: String,
    /// Whether the file lives in the shared namespace.
    pub is_shared: bool,
    /// Upload timestamp (SQLite UTC format).
    pub uploaded_at: String,
}

/// A file record joined with its uploader's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileEntry {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub size: i64,
    pub is_shared: bool,
    pub uploaded_at: String,
    /// `None` when the uploader account no longer exists.
    pub uploader_name: Option<String>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub user_id: String,
    pub filename: String,
    pub size: i64,
    pub path: String,
    pub is_shared: bool,
}

/// Repository for file metadata.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a file record.
    ///
    /// Returns `Ok(None)` if the filename is already taken in the record's
    /// visibility scope.
    pub async fn insert(&self, new_file: &NewFileRecord) -> Result<Option<FileRecord>> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO metadata (id, user_id, filename, size, path, is_shared)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new_file.user_id)
        .bind(&new_file.filename)
        .bind(new_file.size)
        .bind(&new_file.path)
        .bind(new_file.is_shared)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        self.get_by_id(&id)
            .await?
            .map(Some)
            .ok_or_else(|| CloudboxError::NotFound("file".to_string()))
    }

    /// Get a record by ID, regardless of visibility.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM metadata WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Get a record the requester may see: any shared file, or their own.
    pub async fn get_visible(&self, id: &str, requester_id: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM metadata
             WHERE id = ? AND (is_shared = 1 OR user_id = ?)"
        ))
        .bind(id)
        .bind(requester_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// List files in one namespace, newest first.
    ///
    /// Personal listings contain only the requester's files. `keyword`
    /// filters by case-insensitive substring of the filename.
    pub async fn list(
        &self,
        requester_id: &str,
        is_shared: bool,
        keyword: Option<&str>,
    ) -> Result<Vec<FileEntry>> {
        let keyword = keyword.filter(|k| !k.is_empty());

        let entries = sqlx::query_as::<_, FileEntry>(
            "SELECT m.id, m.user_id, m.filename, m.size, m.is_shared, m.uploaded_at,
                    u.username AS uploader_name
             FROM metadata m
             LEFT JOIN users u ON u.id = m.user_id
             WHERE m.is_shared = ?
               AND (m.is_shared = 1 OR m.user_id = ?)
               AND (? IS NULL OR instr(lower(m.filename), lower(?)) > 0)
             ORDER BY m.uploaded_at DESC, m.rowid DESC",
        )
        .bind(is_shared)
        .bind(requester_id)
        .bind(keyword)
        .bind(keyword)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Delete a record by ID.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM metadata WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a record visible to the requester together with its blob.
    ///
    /// The record is deleted inside a transaction, then `remove_blob` is
    /// called with the blob path. The transaction commits only if
    /// `remove_blob` succeeds. Returns `Ok(None)` if there is no such record
    /// visible to the requester.
    pub async fn delete_visible<F, Fut>(
        &self,
        id: &str,
        requester_id: &str,
        remove_blob: F,
    ) -> Result<Option<FileRecord>>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut tx = self.pool.begin().await?;

        // The first statement must write: a deferred transaction that reads
        // first cannot wait for the write lock in WAL mode.
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "DELETE FROM metadata
             WHERE id = ? AND (is_shared = 1 OR user_id = ?)
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(requester_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        // Dropping the transaction on error rolls it back
        remove_blob(PathBuf::from(&record.path)).await?;

        tx.commit().await?;
        Ok(Some(record))
    }
}
