//! User model for CloudBox.

use serde::Serialize;

/// User entity as stored in the credential store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Opaque unique user ID (UUID v4).
    pub id: String,
    /// Login username (unique, case-insensitive).
    pub username: String,
    /// Password hash (Argon2id PHC string).
    pub password_hash: String,
    /// Whether the user is an administrator.
    pub is_admin: bool,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Public view of this user, without the password hash.
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Identity and role of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserInfo {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Whether the user is an administrator.
    pub is_admin: bool,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Password hash (must already be hashed).
    pub password_hash: String,
    /// Whether the user is an administrator.
    pub is_admin: bool,
}

impl NewUser {
    /// Create a new regular user.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            is_admin: false,
        }
    }

    /// Set the admin flag.
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}
