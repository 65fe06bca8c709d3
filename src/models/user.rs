//! User model for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account as stored by the persistence layer.
///
/// Carries the password hash, so it is never returned from a handler
/// directly; see `routes::users::UserResponse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique ID (also used as document ID)
    pub id: Uuid,
    /// Email address, unique and case-sensitive as stored
    pub email: String,
    /// Argon2 PHC string
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user record with a new ID.
    pub fn new(email: String, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            hashed_password,
            created_at: now,
            updated_at: now,
        }
    }
}
