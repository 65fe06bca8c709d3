// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request counter for the static file server.
//!
//! Lives for the life of the process; `/admin/reset` zeroes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, cloneable hit counter.
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one hit and return the new total.
    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn read(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}
