//! First-run admin bootstrap.
//!
//! Guarantees at least one admin exists. On an empty credential store an
//! `admin` account is created with a random password, which is handed to the
//! operator through a one-time credentials file.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use super::password::{hash_password_blocking, HashCost};
use super::secret::write_private_file;
use crate::db::{NewUser, SettingsRepository, UserRepository};
use crate::logging::AUDIT_TARGET;
use crate::{Database, Result};

/// Username of the bootstrap admin.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Length of the generated bootstrap password.
pub const BOOTSTRAP_PASSWORD_LENGTH: usize = 8;

/// Characters the bootstrap password is drawn from.
pub const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$";

/// Result of the bootstrap check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Admins already existed; nothing was changed.
    AlreadyInitialized,
    /// A new admin was created.
    Created {
        user_id: String,
        /// Where the credentials were written, if the write succeeded.
        credentials_file: Option<PathBuf>,
    },
}

/// Generate a random password from [`PASSWORD_ALPHABET`].
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

/// Text of the one-time credentials file.
fn credentials_text(password: &str) -> String {
    format!(
        "CloudBox Temporary Admin Credentials (One-Time Use Only)\n\n\
         Username: {BOOTSTRAP_ADMIN_USERNAME}\n\
         Password: {password}\n\n\
         Log in and reset this password. This file is deleted after the reset.\n"
    )
}

/// Make sure an admin account exists.
///
/// Errors creating the admin are returned and must abort startup. A failed
/// credentials-file write is only logged, together with the password.
pub async fn ensure_admin(
    db: &Database,
    cost: HashCost,
    credentials_file: &Path,
) -> Result<BootstrapOutcome> {
    let users = UserRepository::new(db.pool());
    if users.count_admins().await? > 0 {
        return Ok(BootstrapOutcome::AlreadyInitialized);
    }

    info!("No admin account found; creating bootstrap admin");

    let password = generate_password(BOOTSTRAP_PASSWORD_LENGTH);
    let password_hash = hash_password_blocking(password.clone(), cost).await?;
    let admin = users
        .create(&NewUser::new(BOOTSTRAP_ADMIN_USERNAME, password_hash).with_admin(true))
        .await?;

    SettingsRepository::new(db.pool())
        .start_admin_setup(&admin.id)
        .await?;

    info!(target: AUDIT_TARGET, user_id = %admin.id, "bootstrap admin created");

    let written = match write_private_file(credentials_file, credentials_text(&password).as_bytes())
    {
        Ok(()) => {
            info!(
                "Admin credentials written to {:?}; reset the password after first login",
                credentials_file
            );
            Some(credentials_file.to_path_buf())
        }
        Err(e) => {
            warn!(
                "Failed to write admin credentials to {:?}: {}. Username: {}, password: {}",
                credentials_file, e, BOOTSTRAP_ADMIN_USERNAME, password
            );
            None
        }
    };

    Ok(BootstrapOutcome::Created {
        user_id: admin.id,
        credentials_file: written,
    })
}

/// Extract the password from a credentials file's text.
pub fn parse_credentials_password(text: &str) -> Option<&str> {
    text.lines()
        .find_map(|line| line.strip_prefix("Password: "))
        .map(str::trim)
}
