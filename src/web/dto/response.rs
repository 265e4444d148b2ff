//! Response DTOs for Web API.

use serde::Serialize;

use crate::db::UserInfo;
use crate::file::{FileListing, UploadedFile};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub token: String,
    /// Expiry as unix seconds.
    pub expires_at: i64,
    /// The logged-in user.
    pub user: UserResponse,
}

/// User identity in responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<UserInfo> for UserResponse {
    fn from(user: UserInfo) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

/// One uploaded file.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub size: i64,
    pub is_shared: bool,
}

impl From<UploadedFile> for UploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            file_id: file.id,
            filename: file.filename,
            size: file.size,
            is_shared: file.is_shared,
        }
    }
}

/// One row of a file listing.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub file_id: String,
    pub filename: String,
    pub size: i64,
    pub is_shared: bool,
    pub uploaded_at: String,
    pub uploaded_by: String,
}

impl From<FileListing> for FileResponse {
    fn from(file: FileListing) -> Self {
        Self {
            file_id: file.id,
            filename: file.filename,
            size: file.size,
            is_shared: file.is_shared,
            uploaded_at: file.uploaded_at,
            uploaded_by: file.uploaded_by,
        }
    }
}
