// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration and profile updates.

use crate::error::Result;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::models::User;
use crate::routes::validated;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/users",
        post(create_user).merge(
            put(update_user)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        ),
    )
}

/// Email + password body shared by registration and credential updates.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,
    #[validate(length(min = 1, message = "No password provided"))]
    pub password: String,
}

/// User as returned by the API. Never includes the password hash.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Register a new user.
async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;
    let request = validated(request)?;

    let user = state
        .sessions
        .register(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Change the authenticated user's email and password.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(request) = payload?;
    let request = validated(request)?;

    let user = state
        .sessions
        .update_credentials(auth.user_id, &request.email, &request.password)
        .await?;

    Ok(Json(user.into()))
}
