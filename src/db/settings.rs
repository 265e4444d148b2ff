//! Persistent key/value settings.

use super::DbPool;
use crate::Result;

/// Setting key for the one-way "initial admin has rotated its password" flag.
pub const ADMIN_SETUP_DONE: &str = "admin_setup_done";

/// Setting key holding the id of the bootstrapped admin account.
pub const BOOTSTRAP_ADMIN_ID: &str = "bootstrap_admin_id";

/// Repository for the settings table.
pub struct SettingsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get a setting value.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Insert or replace a setting value.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Whether the initial admin has completed setup.
    pub async fn is_admin_setup_done(&self) -> Result<bool> {
        Ok(self.get(ADMIN_SETUP_DONE).await?.as_deref() == Some("true"))
    }

    /// Record a freshly bootstrapped admin and reset the setup flag to false.
    pub async fn start_admin_setup(&self, admin_id: &str) -> Result<()> {
        self.set(BOOTSTRAP_ADMIN_ID, admin_id).await?;
        self.set(ADMIN_SETUP_DONE, "false").await
    }

    /// Flip the setup flag from false to true if `user_id` is the
    /// bootstrapped admin.
    ///
    /// Returns true only for the call that performed the transition.
    pub async fn mark_admin_setup_done(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE settings SET value = 'true'
             WHERE key = ? AND value = 'false'
               AND EXISTS (SELECT 1 FROM settings WHERE key = ? AND value = ?)",
        )
        .bind(ADMIN_SETUP_DONE)
        .bind(BOOTSTRAP_ADMIN_ID)
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
