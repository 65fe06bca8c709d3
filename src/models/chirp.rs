// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chirp model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Maximum chirp body length, in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// A short post owned by a single user.
///
/// The body has already been validated and moderated by the time a
/// `Chirp` exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    /// Owning user
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chirp {
    pub fn new(body: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            body,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
