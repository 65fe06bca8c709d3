// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hit-counting middleware for the static file server.

use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Count every request that reaches the wrapped routes.
pub async fn count_hits(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let total = state.hits.increment();
    tracing::trace!(total, path = %request.uri().path(), "File server hit");
    next.run(request).await
}
