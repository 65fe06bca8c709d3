// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with the salt embedded, so
//! verification needs nothing but the stored string.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use ring::rand::{SecureRandom, SystemRandom};

const SALT_LEN: usize = 16;

/// Password hashing errors.
///
/// A wrong password is not an error; `verify` returns `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// One-way password hashing and verification.
#[derive(Clone, Default)]
pub struct PasswordVault {
    argon2: Argon2<'static>,
}

impl PasswordVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt_bytes)
            .map_err(|_| PasswordError::Hashing("system RNG unavailable".to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    /// Check a password against a stored hash.
    ///
    /// Fails only when `hash` is not a parseable PHC string.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| PasswordError::Hashing(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, PasswordError> {
        let vault = self.clone();
        tokio::task::spawn_blocking(move || vault.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Hashing(format!("hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        plaintext: String,
        hash: String,
    ) -> Result<bool, PasswordError> {
        let vault = self.clone();
        tokio::task::spawn_blocking(move || vault.verify(&plaintext, &hash))
            .await
            .map_err(|e| PasswordError::Hashing(format!("verify task failed: {}", e)))?
    }
}
