// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod admin;
pub mod chirps;
pub mod sessions;
pub mod users;

use crate::error::{AppError, Result};
use crate::middleware::count_hits;
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use validator::Validate;

/// Readiness check.
async fn health_check() -> &'static str {
    "OK"
}

/// Run `validator` rules, turning failures into a 400 with readable messages.
pub(crate) fn validated<T: Validate>(value: T) -> Result<T> {
    if let Err(errors) = value.validate() {
        let mut messages = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                match &error.message {
                    Some(message) => messages.push(message.to_string()),
                    None => messages.push(format!("Invalid {}", field)),
                }
            }
        }
        messages.sort();
        return Err(AppError::BadRequest(messages.join("; ")));
    }
    Ok(value)
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Static file server; every hit is counted for /admin/metrics
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.static_dir))
        .layer(middleware::from_fn(
            crate::middleware::security::reject_hidden_files,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits));

    let api_routes = Router::new()
        .route("/api/healthz", get(health_check))
        .merge(users::routes(&state))
        .merge(sessions::routes())
        .merge(chirps::routes(&state));

    Router::new()
        .merge(api_routes)
        .merge(admin::routes())
        .merge(file_server)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
