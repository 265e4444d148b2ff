//! Token signing secret management.

use std::fs;
use std::io::Write;
use std::path::Path;

use rand_core::{OsRng, RngCore};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::{CloudboxError, Result};

/// Secret length in bytes before hex encoding.
pub const SECRET_BYTES: usize = 32;

/// Resolve the token signing secret.
///
/// Order: configured value (including the env override), then the secret
/// file, then a newly generated secret which is written to the secret file.
pub fn load_or_generate_secret(config: &AuthConfig) -> Result<String> {
    if !config.jwt_secret.is_empty() {
        return Ok(config.jwt_secret.clone());
    }

    let path = Path::new(&config.secret_file);
    if path.exists() {
        let secret = fs::read_to_string(path)?.trim().to_string();
        if !secret.is_empty() {
            info!("Loaded token secret from {:?}", path);
            return Ok(secret);
        }
        warn!("Secret file {:?} is empty; generating a new secret", path);
    }

    let secret = generate_secret();
    write_private_file(path, secret.as_bytes()).map_err(|e| {
        CloudboxError::Config(format!("cannot write secret file {:?}: {}", path, e))
    })?;
    info!("Generated new token secret at {:?}", path);
    Ok(secret)
}

/// Generate a random hex-encoded secret.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Write a file readable only by the owner, creating parent directories.
pub(crate) fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
