//! Configuration module for CloudBox.

use serde::Deserialize;
use std::path::Path;

use crate::{CloudboxError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/cloudbox.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Root directory for personal files (one subdirectory per user).
    #[serde(default = "default_files_dir")]
    pub files_dir: String,
    /// Directory holding shared files.
    #[serde(default = "default_shared_dir")]
    pub shared_dir: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_files_dir() -> String {
    "uploads".to_string()
}

fn default_shared_dir() -> String {
    "shared".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            shared_dir: default_shared_dir(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret. Generated and persisted to `secret_file` when empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// Where a generated signing secret is stored.
    #[serde(default = "default_secret_file")]
    pub secret_file: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// One-time file holding the bootstrap admin password.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 parallelism.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

fn default_secret_file() -> String {
    "data/jwt_secret".to_string()
}

fn default_token_ttl() -> u64 {
    72
}

fn default_credentials_file() -> String {
    "temp_admin_credentials.txt".to_string()
}

fn default_hash_memory() -> u32 {
    65536 // 64 MB
}

fn default_hash_iterations() -> u32 {
    3
}

fn default_hash_parallelism() -> u32 {
    4
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            secret_file: default_secret_file(),
            token_ttl_hours: default_token_ttl(),
            credentials_file: default_credentials_file(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebConfig {
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Whether audit events for account and file operations are logged.
    #[serde(default = "default_file_ops")]
    pub file_ops: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/server.log".to_string()
}

fn default_file_ops() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            file_ops: default_file_ops(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CloudboxError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CloudboxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CLOUDBOX_JWT_SECRET`: Override the token signing secret
    /// - `CLOUDBOX_PORT`: Override the listen port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("CLOUDBOX_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(port) = std::env::var("CLOUDBOX_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid CLOUDBOX_PORT value: {}", port),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.max_upload_size_mb == 0 {
            return Err(CloudboxError::Config(
                "files.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.auth.token_ttl_hours == 0 {
            return Err(CloudboxError::Config(
                "auth.token_ttl_hours must be greater than 0".to_string(),
            ));
        }
        if Path::new(&self.files.files_dir) == Path::new(&self.files.shared_dir) {
            return Err(CloudboxError::Config(
                "files.files_dir and files.shared_dir must be different directories".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(CloudboxError::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.shutdown_grace_secs, 10);

        assert_eq!(config.database.path, "data/cloudbox.db");
        assert_eq!(config.database.max_connections, 5);

        assert_eq!(config.files.files_dir, "uploads");
        assert_eq!(config.files.shared_dir, "shared");
        assert_eq!(config.files.max_upload_size_mb, 100);
        assert_eq!(config.files.max_upload_bytes(), 100 * 1024 * 1024);

        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.token_ttl_hours, 72);
        assert_eq!(config.auth.credentials_file, "temp_admin_credentials.txt");
        assert_eq!(config.auth.hash_memory_kib, 65536);

        assert!(config.web.cors_origins.is_empty());

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/server.log");
        assert!(config.logging.file_ops);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
shutdown_grace_secs = 3

[database]
path = "custom/db.sqlite"
max_connections = 2

[files]
files_dir = "custom/files"
shared_dir = "custom/shared"
max_upload_size_mb = 20

[auth]
jwt_secret = "test-secret-key"
secret_file = "custom/secret"
token_ttl_hours = 1
credentials_file = "custom/creds.txt"
hash_memory_kib = 1024
hash_iterations = 1
hash_parallelism = 1

[web]
cors_origins = ["http://localhost:5173"]

[logging]
level = "debug"
file = "custom/logs/app.log"
file_ops = false
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.shutdown_grace_secs, 3);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.files.files_dir, "custom/files");
        assert_eq!(config.files.shared_dir, "custom/shared");
        assert_eq!(config.files.max_upload_size_mb, 20);
        assert_eq!(config.auth.jwt_secret, "test-secret-key");
        assert_eq!(config.auth.secret_file, "custom/secret");
        assert_eq!(config.auth.token_ttl_hours, 1);
        assert_eq!(config.auth.credentials_file, "custom/creds.txt");
        assert_eq!(config.auth.hash_memory_kib, 1024);
        assert_eq!(config.auth.hash_iterations, 1);
        assert_eq!(config.auth.hash_parallelism, 1);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.file_ops);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 4000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.files.shared_dir, "shared");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        if let Err(CloudboxError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(CloudboxError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides_jwt_secret() {
        let original = std::env::var("CLOUDBOX_JWT_SECRET").ok();

        std::env::set_var("CLOUDBOX_JWT_SECRET", "env-secret-key");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.auth.jwt_secret, "env-secret-key");

        if let Some(val) = original {
            std::env::set_var("CLOUDBOX_JWT_SECRET", val);
        } else {
            std::env::remove_var("CLOUDBOX_JWT_SECRET");
        }
    }

    #[test]
    fn test_validate_zero_upload_limit() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;
        assert!(matches!(config.validate(), Err(CloudboxError::Config(_))));
    }

    #[test]
    fn test_max_upload_bytes_saturates() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = u64::MAX;
        assert_eq!(config.files.max_upload_bytes(), u64::MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_hours = 0;
        assert!(matches!(config.validate(), Err(CloudboxError::Config(_))));
    }

    #[test]
    fn test_validate_same_directories() {
        let mut config = Config::default();
        config.files.shared_dir = config.files.files_dir.clone();

        let result = config.validate();
        if let Err(CloudboxError::Config(msg)) = result {
            assert!(msg.contains("shared_dir"));
        } else {
            panic!("Expected Config error");
        }
    }
}
