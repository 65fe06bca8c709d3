// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login sessions: registration, login, refresh and revoke.
//!
//! A session moves `Anonymous → Authenticated → (Refreshed)* → Revoked`.
//! Revocation is per refresh token; a user can always log in again to start
//! a new session.

use crate::db::{DbError, Store};
use crate::error::AppError;
use crate::models::User;
use crate::services::access_token::{AccessTokenCodec, TokenError};
use crate::services::password::{PasswordError, PasswordVault};
use crate::services::refresh_token::{RefreshTokenError, RefreshTokenStore};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token already revoked")]
    AlreadyRevoked,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("session internal failure: {0}")]
    Internal(String),
}

impl From<PasswordError> for SessionError {
    fn from(err: PasswordError) -> Self {
        SessionError::Internal(err.to_string())
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        SessionError::Internal(err.to_string())
    }
}

impl From<RefreshTokenError> for SessionError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::NotFound
            | RefreshTokenError::Expired
            | RefreshTokenError::Revoked => SessionError::InvalidRefreshToken,
            RefreshTokenError::AlreadyRevoked => SessionError::AlreadyRevoked,
            RefreshTokenError::Rng | RefreshTokenError::Storage(_) => {
                SessionError::Internal(err.to_string())
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials
            | SessionError::InvalidRefreshToken
            | SessionError::AlreadyRevoked => AppError::Unauthorized(err.to_string()),
            SessionError::EmailTaken => AppError::Conflict(err.to_string()),
            SessionError::UserNotFound => AppError::NotFound(err.to_string()),
            SessionError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates the password vault, access tokens and refresh tokens.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn Store>,
    vault: PasswordVault,
    access_tokens: AccessTokenCodec,
    refresh_tokens: RefreshTokenStore,
}

impl SessionService {
    pub fn new(store: Arc<dyn Store>, access_tokens: AccessTokenCodec) -> Self {
        Self {
            refresh_tokens: RefreshTokenStore::new(store.clone()),
            store,
            vault: PasswordVault::new(),
            access_tokens,
        }
    }

    /// Create an account.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let hashed = self.vault.hash_blocking(password.to_string()).await?;

        let user = self
            .store
            .create_user(email, &hashed)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => SessionError::EmailTaken,
                other => SessionError::Internal(other.to_string()),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        let Some(user) = user else {
            tracing::info!("Login rejected: unknown email");
            return Err(SessionError::InvalidCredentials);
        };

        let matched = self
            .vault
            .verify_blocking(password.to_string(), user.hashed_password.clone())
            .await?;
        if !matched {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(SessionError::InvalidCredentials);
        }

        let access_token = self.access_tokens.issue(user.id)?;
        let (refresh_token, _) = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token. The refresh token is
    /// not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
        let user_id = self.refresh_tokens.validate(refresh_token).await.map_err(|e| {
            tracing::info!(reason = %e, "Refresh rejected");
            SessionError::from(e)
        })?;

        let access_token = self.access_tokens.issue(user_id)?;
        tracing::debug!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        self.refresh_tokens.revoke(refresh_token).await.map_err(|e| {
            tracing::info!(reason = %e, "Revoke rejected");
            SessionError::from(e)
        })
    }

    /// Replace the email and password of an existing user.
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let hashed = self.vault.hash_blocking(password.to_string()).await?;

        let user = self
            .store
            .update_user(user_id, email, &hashed)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => SessionError::EmailTaken,
                other => SessionError::Internal(other.to_string()),
            })?
            .ok_or(SessionError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "User credentials updated");
        Ok(user)
    }
}
