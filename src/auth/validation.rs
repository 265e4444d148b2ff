//! Input validation for account names.

use thiserror::Error;

use crate::CloudboxError;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty.
    #[error("username cannot be empty")]
    UsernameEmpty,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains whitespace or control characters.
    #[error("username cannot contain whitespace or control characters")]
    UsernameInvalidChars,
}

impl From<ValidationError> for CloudboxError {
    fn from(e: ValidationError) -> Self {
        CloudboxError::Validation(e.to_string())
    }
}

/// Validate a username for a new account.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}
