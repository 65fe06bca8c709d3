// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chirpy: a small social-posting API.
//!
//! Users register, log in for a short-lived access token plus a long-lived
//! refresh token, and post moderated 140-character chirps that only their
//! author may delete.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{AccessTokenCodec, ContentModerator, HitCounter, SessionService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub access_tokens: AccessTokenCodec,
    pub sessions: SessionService,
    pub moderator: ContentModerator,
    pub hits: HitCounter,
}

impl AppState {
    /// Wire up services from configuration over the given store.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let access_tokens =
            AccessTokenCodec::new(config.jwt_secret.clone(), config.access_token_ttl);
        let sessions = SessionService::new(store.clone(), access_tokens.clone());
        let moderator =
            ContentModerator::new(&config.denylist, services::moderation::DEFAULT_MASK);

        Self {
            config,
            store,
            access_tokens,
            sessions,
            moderator,
            hits: HitCounter::new(),
        }
    }
}
