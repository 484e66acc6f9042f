//! User and Session entities for operator dashboard access.
//!
//! The domain `User` deliberately carries no password hash: hashes stay
//! inside the store implementations and never cross the store boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dashboard operator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default role for new users.
pub const DEFAULT_ROLE: &str = "user";

/// Input for `UserStore::create`. The plaintext password is hashed
/// inside the store and discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Partial update for a user. A present `password` replaces the stored
/// hash.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.role.is_none() && self.password.is_none()
    }
}

/// An authenticated dashboard session. The opaque `token` is the sole
/// lookup key; rows for a deleted user are cascade-deleted by the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid only while `expires_at` is in the future.
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}
