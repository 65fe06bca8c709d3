// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: login, refresh, revoke.

use crate::error::{AppError, Result};
use crate::middleware::auth::extract_bearer;
use crate::routes::users::UserResponse;
use crate::routes::validated;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "No e-mail provided"))]
    pub email: String,
    #[validate(length(min = 1, message = "No password provided"))]
    pub password: String,
}

/// Login response: the user plus both tokens.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Access token (JWT)
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RefreshResponse {
    pub token: String,
}

/// Exchange email + password for an access token and a refresh token.
async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload?;
    let request = validated(request)?;

    let outcome = state
        .sessions
        .login(&request.email, &request.password)
        .await?;

    let user = UserResponse::from(outcome.user);
    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

fn bearer(headers: &HeaderMap) -> Result<&str> {
    extract_bearer(headers).map_err(|e| AppError::Unauthorized(e.to_string()))
}

/// Mint a new access token from the refresh token in the Authorization header.
async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let token = state.sessions.refresh(bearer(&headers)?).await?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke the refresh token in the Authorization header.
async fn revoke(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<StatusCode> {
    state.sessions.revoke(bearer(&headers)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
