// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, hit counting, security headers).

pub mod auth;
pub mod hits;
pub mod security;

pub use auth::{authorize, extract_bearer, require_auth, AuthUser};
pub use hits::count_hits;
