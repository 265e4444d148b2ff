//! Password hashing and validation for CloudBox.
//!
//! Uses Argon2id for secure password hashing. Hashing is CPU and memory
//! heavy, so request paths use the `*_blocking` wrappers that move the work
//! onto tokio's blocking pool.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::CloudboxError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

impl From<PasswordError> for CloudboxError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => CloudboxError::WeakPassword(MIN_PASSWORD_LENGTH),
            PasswordError::TooLong => CloudboxError::Validation(e.to_string()),
            PasswordError::InvalidHash | PasswordError::VerificationFailed => {
                CloudboxError::InvalidCredentials
            }
            PasswordError::HashError(msg) => CloudboxError::Internal(msg),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Time cost (iterations).
    pub iterations: u32,
    /// Parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashCost {
    /// 64 MB, 3 iterations, 4 lanes.
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashCost {
    /// Cost parameters from the `[auth]` config section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            memory_kib: config.hash_memory_kib,
            iterations: config.hash_iterations,
            parallelism: config.hash_parallelism,
        }
    }

    /// Smallest parameters Argon2 accepts. Only for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
/// Length policy is not applied here; call [`validate_password`] first where
/// the password comes from a user.
///
/// # Examples
///
/// ```
/// use cloudbox::auth::{hash_password, HashCost};
///
/// let hash = hash_password("my_secure_password", &HashCost::minimal()).unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str, cost: &HashCost) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = cost
        .argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(())` if the password matches, or an error if it doesn't.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    // Parameters are taken from the parsed hash
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Validate password requirements.
///
/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Hash a password on the blocking thread pool.
pub async fn hash_password_blocking(password: String, cost: HashCost) -> crate::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, &cost))
        .await
        .map_err(|e| CloudboxError::Internal(e.to_string()))?
        .map_err(CloudboxError::from)
}

/// Verify a password on the blocking thread pool.
///
/// Returns `Ok(false)` on mismatch or an unparseable stored hash.
pub async fn verify_password_blocking(password: String, hash: String) -> crate::Result<bool> {
    let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CloudboxError::Internal(e.to_string()))?;
    Ok(outcome.is_ok())
}
