// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: hit metrics and development reset.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/metrics", get(metrics))
        .route("/admin/reset", post(reset))
}

/// HTML page with the file server hit count.
async fn metrics(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>",
        state.hits.read()
    ))
}

/// Zero the hit counter and wipe the store. Only available on `PLATFORM=dev`.
async fn reset(State(state): State<Arc<AppState>>) -> Result<&'static str> {
    if !state.config.is_dev() {
        tracing::warn!(platform = %state.config.platform, "Blocked reset outside dev");
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    state.hits.reset();
    state.store.reset().await?;

    tracing::info!("Hit counter and store reset");
    Ok("Hits reset to 0 and database reset to initial state.")
}
