//! File management module for CloudBox.
//!
//! This module provides:
//! - Blob storage with staged writes
//! - File metadata records with per-namespace unique names
//! - The file service enforcing ownership and visibility

mod metadata;
pub mod naming;
mod service;
mod storage;

pub use metadata::{FileEntry, FileRecord, FileRepository, NewFileRecord};
pub use naming::{candidate_name, sanitize_file_id, sanitize_filename};
pub use service::{
    FileDownload, FileListing, FileService, UploadedFile, MAX_NAME_ATTEMPTS, OWN_FILE_LABEL,
    UNKNOWN_UPLOADER,
};
pub use storage::FileStorage;
