// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token authentication and ownership checks.

use crate::error::AppError;
use crate::services::AccessTokenCodec;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing or malformed bearer credential")]
    Missing,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("You do not own this resource")]
    Forbidden,
}

impl From<CredentialError> for GuardError {
    fn from(_: CredentialError) -> Self {
        GuardError::Unauthenticated
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            GuardError::Forbidden => AppError::Forbidden(err.to_string()),
        }
    }
}

/// Authenticated user extracted from an access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Pull the raw token out of a single `Authorization: Bearer <token>` header.
///
/// The value is not decoded; callers treat it as an access or refresh token.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next().ok_or(CredentialError::Missing)?;
    if values.next().is_some() {
        return Err(CredentialError::Missing);
    }

    let token = value
        .to_str()
        .map_err(|_| CredentialError::Missing)?
        .strip_prefix("Bearer ")
        .ok_or(CredentialError::Missing)?
        .trim();

    if token.is_empty() {
        return Err(CredentialError::Missing);
    }
    Ok(token)
}

/// Resolve the request's access token to a user ID.
pub fn authenticate(headers: &HeaderMap, codec: &AccessTokenCodec) -> Result<Uuid, GuardError> {
    let token = extract_bearer(headers)?;
    codec.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "Access token rejected");
        GuardError::Unauthenticated
    })
}

/// Allow the request only if its access token belongs to `resource_owner`.
///
/// Returns the authenticated subject on success.
pub fn authorize(
    headers: &HeaderMap,
    codec: &AccessTokenCodec,
    resource_owner: Uuid,
) -> Result<Uuid, GuardError> {
    let subject = authenticate(headers, codec)?;
    if subject != resource_owner {
        tracing::warn!(
            user_id = %subject,
            owner_id = %resource_owner,
            "Blocked mutation of resource owned by another user"
        );
        return Err(GuardError::Forbidden);
    }
    Ok(subject)
}

/// Middleware that requires a valid access token and exposes [`AuthUser`].
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = authenticate(request.headers(), &state.access_tokens)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
