// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chirp body validation and profanity masking.

use crate::models::chirp::MAX_CHIRP_LENGTH;
use std::collections::HashSet;

/// Replacement for a denylisted word.
pub const DEFAULT_MASK: &str = "****";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModerationError {
    #[error("Chirp is empty")]
    EmptyContent,

    #[error("Chirp is too long")]
    ContentTooLong,
}

impl From<ModerationError> for crate::error::AppError {
    fn from(err: ModerationError) -> Self {
        crate::error::AppError::BadRequest(err.to_string())
    }
}

/// Length validation plus word-level denylist filtering.
///
/// Filtering is whitespace-normalizing: the output is the input's words
/// joined by single spaces.
#[derive(Debug, Clone)]
pub struct ContentModerator {
    /// Lowercased denylist
    denylist: HashSet<String>,
    mask: String,
}

impl Default for ContentModerator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DENYLIST.iter().copied(), DEFAULT_MASK)
    }
}

impl ContentModerator {
    /// Build a moderator. Denylist entries match case-insensitively.
    ///
    /// A denylist entry equal to the mask would make filtering non-idempotent,
    /// so such entries are dropped.
    pub fn new<I, S>(denylist: I, mask: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mask_lower = mask.to_lowercase();
        let denylist = denylist
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && *w != mask_lower)
            .collect();

        Self {
            denylist,
            mask: mask.to_string(),
        }
    }

    /// Check the body length in characters: must be in `1..=140`.
    ///
    /// A whitespace-only body counts as empty, since filtering would
    /// reduce it to nothing.
    pub fn validate(&self, body: &str) -> Result<(), ModerationError> {
        if body.trim().is_empty() {
            return Err(ModerationError::EmptyContent);
        }
        if body.chars().count() > MAX_CHIRP_LENGTH {
            return Err(ModerationError::ContentTooLong);
        }
        Ok(())
    }

    /// Mask every denylisted word.
    pub fn filter(&self, body: &str) -> String {
        body.split_whitespace()
            .map(|word| {
                if self.denylist.contains(&word.to_lowercase()) {
                    self.mask.as_str()
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validate, then filter.
    pub fn moderate(&self, body: &str) -> Result<String, ModerationError> {
        self.validate(body)?;
        Ok(self.filter(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sentence() {
        let moderator = ContentModerator::default();
        assert_eq!(
            moderator.filter("This is a kerfuffle opinion I need to share"),
            "This is a **** opinion I need to share"
        );
    }

    #[test]
    fn test_case_insensitive_whole_words_only() {
        let moderator = ContentModerator::default();
        assert_eq!(
            moderator.filter("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(moderator.filter("FORNAX Fornax fornax"), "**** **** ****");
        // Punctuation makes it a different token
        assert_eq!(moderator.filter("Sharbert!"), "Sharbert!");
        assert_eq!(moderator.filter("kerfuffles"), "kerfuffles");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let moderator = ContentModerator::default();
        assert_eq!(moderator.filter("  hello \t\n world  "), "hello world");
        assert_eq!(moderator.filter("   "), "");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let moderator = ContentModerator::default();
        for input in [
            "kerfuffle",
            "a  kerfuffle  and a sharbert ",
            "**** fornax ****",
            "",
            "nothing to see here",
        ] {
            let once = moderator.filter(input);
            assert_eq!(moderator.filter(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_mask_in_denylist_is_ignored() {
        let moderator = ContentModerator::new(["****", "bad"], DEFAULT_MASK);
        let once = moderator.filter("bad ****");
        assert_eq!(once, "**** ****");
        assert_eq!(moderator.filter(&once), once);
    }

    #[test]
    fn test_configured_denylist() {
        let moderator = ContentModerator::new(["Heck"], "#");
        assert_eq!(moderator.filter("what the heck kerfuffle"), "what the # kerfuffle");
    }

    #[test]
    fn test_length_boundaries() {
        let moderator = ContentModerator::default();
        assert_eq!(moderator.validate(&"a".repeat(140)), Ok(()));
        assert_eq!(
            moderator.validate(&"a".repeat(141)),
            Err(ModerationError::ContentTooLong)
        );
        assert_eq!(moderator.validate(""), Err(ModerationError::EmptyContent));
        assert_eq!(
            moderator.validate(" \t\n"),
            Err(ModerationError::EmptyContent)
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let moderator = ContentModerator::default();
        // 140 three-byte characters
        let body = "€".repeat(140);
        assert_eq!(body.len(), 420);
        assert_eq!(moderator.validate(&body), Ok(()));
    }

    #[test]
    fn test_moderate_rejects_before_filtering() {
        let moderator = ContentModerator::default();
        assert_eq!(
            moderator.moderate(&"kerfuffle ".repeat(20)),
            Err(ModerationError::ContentTooLong)
        );
        assert_eq!(
            moderator.moderate("a sharbert"),
            Ok("a ****".to_string())
        );
    }
}
