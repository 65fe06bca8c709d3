// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque refresh tokens.
//!
//! Token values are 256 random bits, hex-encoded. Persistence is delegated
//! to the [`Store`]; this service owns the expiry and revocation rules.

use crate::db::{DbError, Store};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use uuid::Uuid;

/// Random bytes per token (hex doubles this on the wire).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Lifetime of a refresh token from issuance.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token expired")]
    Expired,

    #[error("refresh token revoked")]
    Revoked,

    #[error("refresh token already revoked")]
    AlreadyRevoked,

    #[error("random generator failure")]
    Rng,

    #[error("refresh token storage failed: {0}")]
    Storage(String),
}

/// Generate a fresh opaque token value.
pub fn generate() -> Result<String, RefreshTokenError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| RefreshTokenError::Rng)?;
    Ok(hex::encode(bytes))
}

/// Issues, validates and revokes refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenStore {
    store: Arc<dyn Store>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            lifetime: Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        }
    }

    /// Override the token lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Create and persist a token for `user_id`.
    pub async fn issue(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), RefreshTokenError> {
        let token = generate()?;
        let expires_at = Utc::now() + self.lifetime;

        self.store
            .create_refresh_token(&token, user_id, expires_at)
            .await
            .map_err(|e| RefreshTokenError::Storage(e.to_string()))?;

        tracing::debug!(user_id = %user_id, expires_at = %expires_at, "Refresh token issued");
        Ok((token, expires_at))
    }

    /// Resolve a token to its owner if it is still usable.
    ///
    /// Expiry is checked before revocation, so an expired token reports
    /// `Expired` even if it was also revoked.
    pub async fn validate(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let row = self
            .store
            .find_refresh_token(token)
            .await
            .map_err(|e| RefreshTokenError::Storage(e.to_string()))?
            .ok_or(RefreshTokenError::NotFound)?;

        if row.is_expired_at(Utc::now()) {
            return Err(RefreshTokenError::Expired);
        }
        if row.is_revoked() {
            return Err(RefreshTokenError::Revoked);
        }
        Ok(row.user_id)
    }

    /// Revoke a token. A second revoke fails with `AlreadyRevoked`.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        match self.store.revoke_refresh_token(token).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(RefreshTokenError::NotFound),
            Err(DbError::Conflict(_)) => Err(RefreshTokenError::AlreadyRevoked),
            Err(DbError::Backend(e)) => Err(RefreshTokenError::Storage(e)),
        }
    }
}
