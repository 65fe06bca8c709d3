// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Everything above this module talks to persistence through the [`Store`]
//! trait. Two backends exist: [`MemoryStore`] for tests and local runs, and
//! [`FirestoreStore`] for deployments.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Chirp, RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// One document per registered email, keyed by the hex-encoded address
    pub const USER_EMAILS: &str = "user_emails";
    pub const REFRESH_TOKENS: &str = "refresh_tokens";
    pub const CHIRPS: &str = "chirps";
}

/// Errors reported by a [`Store`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The addressed row does not exist (or is not owned by the caller).
    #[error("record not found")]
    NotFound,

    /// A uniqueness or state precondition failed.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Backend(String),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => AppError::NotFound("Resource not found".to_string()),
            DbError::Conflict(msg) => AppError::Conflict(msg),
            DbError::Backend(msg) => AppError::Database(msg),
        }
    }
}

/// Persistence collaborator for users, refresh tokens and chirps.
///
/// Implementations own their concurrency safety. In particular
/// `revoke_refresh_token` must be a conditional update: of two racing
/// revocations of the same token, exactly one succeeds.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError>;

    /// Create a user. Fails with `Conflict` if the email is already taken.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DbError>;

    /// Replace a user's email and password hash. `Ok(None)` if no such user.
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, DbError>;

    // ─── Refresh Tokens ──────────────────────────────────────────

    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DbError>;

    /// Set the revocation timestamp. `NotFound` if absent, `Conflict` if
    /// already revoked.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError>;

    // ─── Chirps ──────────────────────────────────────────────────

    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, DbError>;

    /// All chirps, oldest first.
    async fn list_chirps(&self) -> Result<Vec<Chirp>, DbError>;

    async fn find_chirp_by_id(&self, id: Uuid) -> Result<Option<Chirp>, DbError>;

    /// Delete a chirp owned by `user_id`. `NotFound` if there is no such
    /// chirp for that owner.
    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<(), DbError>;

    // ─── Admin ───────────────────────────────────────────────────

    /// Remove every row. Development only.
    async fn reset(&self) -> Result<(), DbError>;
}
