//! Error types for CloudBox.

use thiserror::Error;

/// Broad failure classes used to map errors onto client-visible responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unacceptable input.
    InputValidation,
    /// Caller could not be authenticated.
    AuthenticationFailure,
    /// Caller is authenticated but not allowed to do this.
    AuthorizationFailure,
    /// Conflicts with existing state (duplicate username).
    Conflict,
    /// Resource does not exist or is not visible to the caller.
    NotFound,
    /// Disk or database failure.
    StorageFailure,
    /// Operation would break an account invariant.
    InvariantViolation,
}

/// Common error type for CloudBox.
#[derive(Error, Debug)]
pub enum CloudboxError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// New password does not meet the length policy.
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    /// Wrong username/password, or unknown user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token signature, structure or expiry check failed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The bootstrap admin has not rotated the initial password yet.
    #[error("admin setup is not complete; the admin must reset the initial password first")]
    SetupIncomplete,

    /// Operation requires a role the caller does not have.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Username is already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// Admins cannot delete their own account.
    #[error("cannot delete your own account")]
    SelfDeleteForbidden,

    /// Deleting this account would leave no admin.
    #[error("cannot delete the only remaining admin")]
    LastAdminForbidden,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Upload could not be completed.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// Unexpected internal failure (hashing, task join).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CloudboxError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudboxError::Validation(_) | CloudboxError::WeakPassword(_) => {
                ErrorKind::InputValidation
            }
            CloudboxError::InvalidCredentials
            | CloudboxError::InvalidToken
            | CloudboxError::SetupIncomplete => ErrorKind::AuthenticationFailure,
            CloudboxError::Forbidden(_) => ErrorKind::AuthorizationFailure,
            CloudboxError::DuplicateUsername(_) => ErrorKind::Conflict,
            CloudboxError::NotFound(_) => ErrorKind::NotFound,
            CloudboxError::SelfDeleteForbidden | CloudboxError::LastAdminForbidden => {
                ErrorKind::InvariantViolation
            }
            CloudboxError::Database(_)
            | CloudboxError::Io(_)
            | CloudboxError::Config(_)
            | CloudboxError::UploadFailed(_)
            | CloudboxError::Internal(_) => ErrorKind::StorageFailure,
        }
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for CloudboxError {
    fn from(e: sqlx::Error) -> Self {
        CloudboxError::Database(e.to_string())
    }
}

/// Result type alias for CloudBox operations.
pub type Result<T> = std::result::Result<T, CloudboxError>;
