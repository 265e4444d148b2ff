//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::no_control_chars;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Account creation request (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Username for the new account.
    #[validate(
        length(min = 1, max = 32, message = "Username must be 1-32 characters"),
        custom(function = "no_control_chars")
    )]
    pub username: String,
    /// Initial password. Length policy is enforced by the account service.
    pub password: String,
    /// Whether the new account is an administrator.
    #[serde(default)]
    pub is_admin: bool,
}

/// Password change request.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password. Length policy is enforced by the account service.
    pub new_password: String,
}

/// Query parameters for uploads.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Upload into the shared namespace.
    #[serde(default)]
    pub shared: bool,
}

/// Query parameters for file listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// List the shared namespace instead of personal files.
    #[serde(default)]
    pub shared: bool,
    /// Case-insensitive filename filter.
    pub keyword: Option<String>,
}
