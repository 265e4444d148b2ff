//! API error handling for the CloudBox Web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{CloudboxError, ErrorKind};

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request (400).
    BadRequest,
    /// Field-level validation failure (400).
    ValidationError,
    /// New password too short (400).
    WeakPassword,
    /// Missing or invalid token (401).
    Unauthorized,
    /// Wrong username or password (401).
    InvalidCredentials,
    /// Admin setup pending (401).
    SetupIncomplete,
    /// Role not sufficient (403).
    Forbidden,
    /// Admin tried to delete their own account (403).
    SelfDeleteForbidden,
    /// Deleting the last admin (403).
    LastAdminForbidden,
    /// Not found (404).
    NotFound,
    /// Username taken (409).
    DuplicateUsername,
    /// Request body over the size limit (413).
    PayloadTooLarge,
    /// Upload could not be stored (500).
    UploadFailed,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::ValidationError | ErrorCode::WeakPassword => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthorized
            | ErrorCode::InvalidCredentials
            | ErrorCode::SetupIncomplete => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden
            | ErrorCode::SelfDeleteForbidden
            | ErrorCode::LastAdminForbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::DuplicateUsername => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::UploadFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// HTTP status class for an error kind.
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InputValidation => StatusCode::BAD_REQUEST,
        ErrorKind::AuthenticationFailure => StatusCode::UNAUTHORIZED,
        ErrorKind::AuthorizationFailure | ErrorKind::InvariantViolation => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CloudboxError> for ApiError {
    fn from(err: CloudboxError) -> Self {
        match &err {
            CloudboxError::Validation(msg) => ApiError::new(ErrorCode::ValidationError, msg.clone()),
            CloudboxError::WeakPassword(_) => ApiError::new(ErrorCode::WeakPassword, err.to_string()),
            CloudboxError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
            }
            CloudboxError::InvalidToken => ApiError::unauthorized("Invalid or expired token"),
            CloudboxError::SetupIncomplete => ApiError::new(
                ErrorCode::SetupIncomplete,
                "Please log in as admin and reset the admin password first",
            ),
            CloudboxError::Forbidden(msg) => ApiError::new(ErrorCode::Forbidden, msg.clone()),
            CloudboxError::DuplicateUsername(_) => {
                ApiError::new(ErrorCode::DuplicateUsername, "Username already exists")
            }
            CloudboxError::SelfDeleteForbidden => {
                ApiError::new(ErrorCode::SelfDeleteForbidden, err.to_string())
            }
            CloudboxError::LastAdminForbidden => {
                ApiError::new(ErrorCode::LastAdminForbidden, err.to_string())
            }
            CloudboxError::NotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CloudboxError::UploadFailed(_) => {
                tracing::error!("Upload error: {}", err);
                ApiError::new(ErrorCode::UploadFailed, "Upload failed")
            }
            CloudboxError::Database(_)
            | CloudboxError::Io(_)
            | CloudboxError::Config(_)
            | CloudboxError::Internal(_) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
