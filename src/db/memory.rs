// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used by the test suite and for local runs without Firestore. Row-level
//! atomicity comes from DashMap's per-shard locks.

use crate::db::{DbError, Store};
use crate::models::{Chirp, RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// Memory-backed [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    /// Unique email index: email -> user id
    emails: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, RefreshToken>,
    chirps: DashMap<Uuid, Chirp>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DbError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => Err(DbError::Conflict(format!(
                "email {email} is already registered"
            ))),
            Entry::Vacant(slot) => {
                let user = User::new(email.to_string(), hashed_password.to_string());
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, DbError> {
        let Some(current_email) = self.users.get(&id).map(|user| user.email.clone()) else {
            return Ok(None);
        };

        if current_email != email {
            match self.emails.entry(email.to_string()) {
                Entry::Occupied(_) => {
                    return Err(DbError::Conflict(format!(
                        "email {email} is already registered"
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&current_email);
        }

        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        match self.refresh_tokens.entry(token.to_string()) {
            Entry::Occupied(_) => Err(DbError::Conflict("refresh token already exists".into())),
            Entry::Vacant(slot) => {
                slot.insert(RefreshToken::new(token.to_string(), user_id, expires_at));
                Ok(())
            }
        }
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DbError> {
        Ok(self.refresh_tokens.get(token).map(|row| row.clone()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError> {
        // get_mut holds the shard write lock, so check-and-set is atomic.
        let mut row = self.refresh_tokens.get_mut(token).ok_or(DbError::NotFound)?;
        if row.revoked_at.is_some() {
            return Err(DbError::Conflict("refresh token already revoked".into()));
        }
        let now = Utc::now();
        row.revoked_at = Some(now);
        row.updated_at = now;
        Ok(())
    }

    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, DbError> {
        let chirp = Chirp::new(body.to_string(), user_id);
        self.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DbError> {
        let mut chirps: Vec<Chirp> = self.chirps.iter().map(|c| c.value().clone()).collect();
        chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(chirps)
    }

    async fn find_chirp_by_id(&self, id: Uuid) -> Result<Option<Chirp>, DbError> {
        Ok(self.chirps.get(&id).map(|chirp| chirp.clone()))
    }

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<(), DbError> {
        self.chirps
            .remove_if(&id, |_, chirp| chirp.user_id == user_id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    async fn reset(&self) -> Result<(), DbError> {
        self.chirps.clear();
        self.refresh_tokens.clear();
        self.emails.clear();
        self.users.clear();
        tracing::info!("Memory store reset");
        Ok(())
    }
}
