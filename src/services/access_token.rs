// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed, short-lived access tokens (HS256 JWT).

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Issuer tag stamped into and required from every access token.
pub const ISSUER: &str = "chirpy";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer tag
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally sound but not acceptable: bad signature, wrong issuer, expired.
    #[error("invalid access token")]
    Invalid,

    /// Could not be parsed as a token carrying our claims.
    #[error("malformed access token")]
    Malformed,

    #[error("failed to sign access token: {0}")]
    Signing(String),
}

/// Create an access token for `subject` valid for `ttl`.
pub fn issue(subject: Uuid, secret: &[u8], ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|e| TokenError::Signing(e.to_string()))?;

    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: subject.to_string(),
        iat: now,
        exp: now.saturating_add(ttl_secs),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verify an access token and return its subject.
///
/// Expiry is exact: a token whose `exp` equals the current second is rejected.
pub fn verify(token: &str, secret: &[u8]) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Checked below without leeway.
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| classify(e.kind()))?;

    if token_data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Invalid);
    }

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::Malformed)
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidAlgorithmName => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}

/// Access-token codec bound to the server secret and configured lifetime.
#[derive(Clone)]
pub struct AccessTokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl AccessTokenCodec {
    pub fn new(secret: Vec<u8>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        issue(subject, &self.secret, self.ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        verify(token, &self.secret)
    }
}
