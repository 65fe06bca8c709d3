// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chirp routes.
//!
//! Reads are public. Creating needs an access token; deleting additionally
//! needs the token to belong to the chirp's owner.

use crate::error::{AppError, Result};
use crate::middleware::auth::{authorize, require_auth, AuthUser};
use crate::models::Chirp;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/chirps",
            get(list_chirps).merge(
                post(create_chirp)
                    .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
            ),
        )
        .route(
            "/api/chirps/{chirp_id}",
            get(get_chirp).delete(delete_chirp),
        )
        .route("/api/validate_chirp", post(validate_chirp))
}

#[derive(Debug, Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ValidateChirpResponse {
    pub cleaned_body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid chirp ID".to_string()))
}

/// Post a chirp as the authenticated user.
async fn create_chirp(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<ChirpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>)> {
    let Json(request) = payload?;
    let body = state.moderator.moderate(&request.body)?;

    let chirp = state.store.create_chirp(&body, auth.user_id).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %auth.user_id, "Chirp created");
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// All chirps, oldest first.
async fn list_chirps(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Chirp>>> {
    Ok(Json(state.store.list_chirps().await?))
}

async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    state
        .store
        .find_chirp_by_id(chirp_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))
}

/// Delete a chirp. Only its owner may do so.
async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    let chirp = state
        .store
        .find_chirp_by_id(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    let user_id = authorize(&headers, &state.access_tokens, chirp.user_id)?;

    // Owner-scoped at the store as well; a concurrent delete shows up as 404.
    state
        .store
        .delete_chirp(chirp_id, user_id)
        .await
        .map_err(|e| match e {
            crate::db::DbError::NotFound => AppError::NotFound("Chirp not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(chirp_id = %chirp_id, user_id = %user_id, "Chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Check and clean a chirp body without storing it.
async fn validate_chirp(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChirpRequest>, JsonRejection>,
) -> Result<Json<ValidateChirpResponse>> {
    let Json(request) = payload?;
    let cleaned_body = state.moderator.moderate(&request.body)?;
    Ok(Json(ValidateChirpResponse { cleaned_body }))
}
