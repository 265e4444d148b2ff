//! User repository for CloudBox.
//!
//! CRUD operations on the credential store.

use uuid::Uuid;

use super::user::{NewUser, User, UserInfo};
use super::{is_unique_violation, DbPool};
use crate::{CloudboxError, Result};

/// Outcome of a guarded user deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// The user was deleted.
    Deleted,
    /// No user with that ID exists.
    NotFound,
    /// The user is the last remaining admin and was kept.
    LastAdmin,
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns `DuplicateUsername` if the username is already taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO users (id, username, password_hash, is_admin) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(new_user.is_admin)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CloudboxError::DuplicateUsername(new_user.username.clone())
                } else {
                    CloudboxError::Database(e.to_string())
                }
            })?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| CloudboxError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replace a user's password hash.
    ///
    /// Returns false if the user does not exist.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user unless doing so would leave no admin.
    ///
    /// The admin-count check and the delete are a single statement, so two
    /// concurrent deletions cannot both remove the last two admins.
    pub async fn delete_keeping_admin(&self, id: &str) -> Result<UserDeletion> {
        let result = sqlx::query(
            "DELETE FROM users WHERE id = ?
               AND (is_admin = 0 OR (SELECT COUNT(*) FROM users WHERE is_admin = 1) > 1)",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UserDeletion::Deleted);
        }

        match self.get_by_id(id).await? {
            Some(_) => Ok(UserDeletion::LastAdmin),
            None => Ok(UserDeletion::NotFound),
        }
    }

    /// List all users without credentials, ordered by username.
    pub async fn list_all(&self) -> Result<Vec<UserInfo>> {
        let users = sqlx::query_as::<_, UserInfo>(
            "SELECT id, username, is_admin FROM users ORDER BY username",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count admin users.
    pub async fn count_admins(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin = 1")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Look up the username for a user ID.
    pub async fn username_of(&self, id: &str) -> Result<Option<String>> {
        let username: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(username)
    }
}
