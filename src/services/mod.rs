// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access_token;
pub mod hits;
pub mod moderation;
pub mod password;
pub mod refresh_token;
pub mod session;

pub use access_token::{AccessTokenCodec, TokenError};
pub use hits::HitCounter;
pub use moderation::{ContentModerator, ModerationError};
pub use password::{PasswordError, PasswordVault};
pub use refresh_token::{RefreshTokenError, RefreshTokenStore};
pub use session::{LoginOutcome, SessionError, SessionService};
