// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chirpy API Server

use chirpy::{
    config::{Config, StoreBackend},
    db::{FirestoreStore, MemoryStore, Store},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        platform = %config.platform,
        "Starting Chirpy API"
    );

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config.gcp_project_id).await?),
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));
    tracing::info!(
        denylist = state.config.denylist.len(),
        access_token_ttl_secs = state.config.access_token_ttl.as_secs(),
        static_dir = %state.config.static_dir,
        "Services initialized"
    );

    // Build router
    let app = chirpy::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chirpy=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
