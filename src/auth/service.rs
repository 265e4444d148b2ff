//! Account operations: login, password reset and admin user management.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::password::{
    hash_password_blocking, validate_password, verify_password_blocking, HashCost,
};
use super::token::{Identity, TokenIssuer};
use super::validation::validate_username;
use crate::db::{NewUser, SettingsRepository, UserDeletion, UserInfo, UserRepository};
use crate::logging::AUDIT_TARGET;
use crate::{CloudboxError, Database, Result};

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: i64,
    pub user: UserInfo,
}

/// Account service shared by all request handlers.
#[derive(Debug, Clone)]
pub struct AccountService {
    db: Database,
    tokens: TokenIssuer,
    cost: HashCost,
    credentials_file: PathBuf,
    /// Hash verified against when the username is unknown, so that lookups
    /// of missing accounts cost the same as wrong passwords.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AccountService {
    pub fn new(
        db: Database,
        tokens: TokenIssuer,
        cost: HashCost,
        credentials_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            tokens,
            cost,
            credentials_file: credentials_file.into(),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    fn require_admin(caller: &Identity) -> Result<()> {
        if caller.is_admin {
            Ok(())
        } else {
            Err(CloudboxError::Forbidden("admin privileges required".to_string()))
        }
    }

    async fn dummy_hash(&self) -> Result<&str> {
        let cost = self.cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_password_blocking("cloudbox-dummy-password".to_string(), cost))
            .await?;
        Ok(hash.as_str())
    }

    /// Authenticate with username and password and issue a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        if username.is_empty() || password.is_empty() {
            return Err(CloudboxError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let users = UserRepository::new(self.db.pool());
        let user = match users.get_by_username(username).await? {
            Some(user) => user,
            None => {
                let dummy = self.dummy_hash().await?.to_string();
                let _ = verify_password_blocking(password.to_string(), dummy).await?;
                info!("Login failed for unknown user");
                return Err(CloudboxError::InvalidCredentials);
            }
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            info!(user_id = %user.id, "Login failed: wrong password");
            return Err(CloudboxError::InvalidCredentials);
        }

        if !user.is_admin
            && !SettingsRepository::new(self.db.pool())
                .is_admin_setup_done()
                .await?
        {
            info!(user_id = %user.id, "Login refused: admin setup incomplete");
            return Err(CloudboxError::SetupIncomplete);
        }

        let issued = self.tokens.issue(&user.id, user.is_admin)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.info(),
        })
    }

    /// Create a new account. Admin only.
    pub async fn create_user(
        &self,
        caller: &Identity,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<UserInfo> {
        Self::require_admin(caller)?;
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password_blocking(password.to_string(), self.cost).await?;
        let user = UserRepository::new(self.db.pool())
            .create(&NewUser::new(username, password_hash).with_admin(is_admin))
            .await?;

        info!(
            target: AUDIT_TARGET,
            actor = %caller.user_id,
            user_id = %user.id,
            username = %user.username,
            is_admin = user.is_admin,
            "user created"
        );
        Ok(user.info())
    }

    /// Change the caller's own password.
    ///
    /// The bootstrap admin's first successful reset completes admin setup
    /// and removes the one-time credentials file.
    pub async fn reset_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        validate_password(new_password)?;

        let users = UserRepository::new(self.db.pool());
        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CloudboxError::NotFound("user".to_string()))?;

        if !verify_password_blocking(current_password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(CloudboxError::InvalidCredentials);
        }

        let password_hash = hash_password_blocking(new_password.to_string(), self.cost).await?;
        if !users.update_password(&user.id, &password_hash).await? {
            return Err(CloudboxError::NotFound("user".to_string()));
        }
        info!(target: AUDIT_TARGET, user_id = %user.id, "password reset");

        if user.is_admin
            && SettingsRepository::new(self.db.pool())
                .mark_admin_setup_done(&user.id)
                .await?
        {
            info!("Admin setup complete");
            self.remove_credentials_file().await;
        }

        Ok(())
    }

    async fn remove_credentials_file(&self) {
        match tokio::fs::remove_file(&self.credentials_file).await {
            Ok(()) => info!("Removed one-time credentials file {:?}", self.credentials_file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove credentials file {:?}: {}",
                self.credentials_file, e
            ),
        }
    }

    /// Delete an account. Admin only; never the caller's own, never the last admin.
    pub async fn delete_user(&self, caller: &Identity, target_id: &str) -> Result<()> {
        Self::require_admin(caller)?;
        if caller.user_id == target_id {
            return Err(CloudboxError::SelfDeleteForbidden);
        }

        match UserRepository::new(self.db.pool())
            .delete_keeping_admin(target_id)
            .await?
        {
            UserDeletion::Deleted => {
                info!(
                    target: AUDIT_TARGET,
                    actor = %caller.user_id,
                    user_id = %target_id,
                    "user deleted"
                );
                Ok(())
            }
            UserDeletion::NotFound => Err(CloudboxError::NotFound("user".to_string())),
            UserDeletion::LastAdmin => Err(CloudboxError::LastAdminForbidden),
        }
    }

    /// List all accounts. Admin only.
    pub async fn list_users(&self, caller: &Identity) -> Result<Vec<UserInfo>> {
        Self::require_admin(caller)?;
        UserRepository::new(self.db.pool()).list_all().await
    }

    /// The caller's own account.
    pub async fn current_user(&self, user_id: &str) -> Result<UserInfo> {
        UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .map(|u| u.info())
            .ok_or_else(|| CloudboxError::NotFound("user".to_string()))
    }
}
