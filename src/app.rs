//! Application context shared by all request handlers.

use std::sync::Arc;

use crate::auth::{AccountService, HashCost, TokenIssuer};
use crate::file::{FileService, FileStorage};
use crate::{Config, Database, Result};

/// Everything a request handler needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Loaded configuration.
    pub config: Config,
    /// Database pool.
    pub db: Database,
    /// Token issuer/verifier.
    pub tokens: Arc<TokenIssuer>,
    /// Account operations.
    pub accounts: AccountService,
    /// File operations.
    pub files: FileService,
}

impl AppContext {
    /// Build the context from configuration, an open database and the
    /// token signing secret. Creates the storage directories.
    pub fn new(config: Config, db: Database, secret: &str) -> Result<Self> {
        let tokens = TokenIssuer::new(secret, config.auth.token_ttl_hours);
        let cost = HashCost::from_config(&config.auth);

        let accounts = AccountService::new(
            db.clone(),
            tokens.clone(),
            cost,
            &config.auth.credentials_file,
        );

        let storage = FileStorage::new(&config.files.files_dir, &config.files.shared_dir)?;
        let files = FileService::new(db.clone(), storage, config.files.max_upload_bytes());

        Ok(Self {
            config,
            db,
            tokens: Arc::new(tokens),
            accounts,
            files,
        })
    }
}
