//! User entity model.

use chrono::{DateTime, Utc};
use moviez_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}
