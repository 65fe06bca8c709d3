// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running:
//!
//! ```text
//! gcloud emulators firestore start --host-port=localhost:8081
//! FIRESTORE_EMULATOR_HOST=localhost:8081 cargo test --test firestore_integration
//! ```
//!
//! Each test uses unique emails and IDs so they can share one emulator.

use chirpy::db::{DbError, Store};
use chrono::{Duration, Utc};
use uuid::Uuid;

mod common;
use common::test_firestore;

/// Generate a unique email for test isolation.
fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_create_and_lookup() {
    require_emulator!();

    let store = test_firestore().await;
    let email = unique_email("create");

    let before = store.find_user_by_email(&email).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    let user = store.create_user(&email, "$argon2id$hash").await.unwrap();

    let by_email = store.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.hashed_password, "$argon2id$hash");

    let by_id = store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, email);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    require_emulator!();

    let store = test_firestore().await;
    let email = unique_email("dup");

    store.create_user(&email, "h1").await.unwrap();
    let err = store.create_user(&email, "h2").await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_update_user() {
    require_emulator!();

    let store = test_firestore().await;
    let user = store.create_user(&unique_email("old"), "h1").await.unwrap();
    let new_email = unique_email("new");

    let updated = store
        .update_user(user.id, &new_email, "h2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.email, new_email);
    assert_eq!(updated.hashed_password, "h2");
    assert!(updated.updated_at >= user.updated_at);

    let missing = store
        .update_user(Uuid::new_v4(), &unique_email("ghost"), "h")
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// REFRESH TOKEN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_refresh_token_revoke_once() {
    require_emulator!();

    let store = test_firestore().await;
    let user = store.create_user(&unique_email("rt"), "h").await.unwrap();
    let token = chirpy::services::refresh_token::generate().unwrap();

    store
        .create_refresh_token(&token, user.id, Utc::now() + Duration::days(60))
        .await
        .unwrap();

    let stored = store.find_refresh_token(&token).await.unwrap().unwrap();
    assert_eq!(stored.user_id, user.id);
    assert!(!stored.is_revoked());

    store.revoke_refresh_token(&token).await.unwrap();
    let stored = store.find_refresh_token(&token).await.unwrap().unwrap();
    assert!(stored.is_revoked());

    let again = store.revoke_refresh_token(&token).await.unwrap_err();
    assert!(matches!(again, DbError::Conflict(_)), "got {:?}", again);

    let missing = store.revoke_refresh_token("no-such-token").await.unwrap_err();
    assert!(matches!(missing, DbError::NotFound), "got {:?}", missing);
}

#[tokio::test]
async fn test_concurrent_revokes_have_one_winner() {
    require_emulator!();

    let store = test_firestore().await;
    let user = store.create_user(&unique_email("race"), "h").await.unwrap();
    let token = chirpy::services::refresh_token::generate().unwrap();
    store
        .create_refresh_token(&token, user.id, Utc::now() + Duration::days(60))
        .await
        .unwrap();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = store.clone();
            let token = token.clone();
            tokio::spawn(async move { store.revoke_refresh_token(&token).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(DbError::Conflict(_)) => {}
            Err(other) => panic!("unexpected revoke error: {:?}", other),
        }
    }
    assert_eq!(winners, 1, "Exactly one revocation should succeed");

    let stored = store.find_refresh_token(&token).await.unwrap().unwrap();
    assert!(stored.is_revoked());
}

#[tokio::test]
async fn test_concurrent_registrations_have_one_winner() {
    require_emulator!();

    let store = test_firestore().await;
    let email = unique_email("race");

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let store = store.clone();
            let email = email.clone();
            tokio::spawn(async move { store.create_user(&email, &format!("h{i}")).await })
        })
        .collect();

    let mut created = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(user) => created.push(user),
            Err(DbError::Conflict(_)) => {}
            Err(other) => panic!("unexpected create error: {:?}", other),
        }
    }
    assert_eq!(created.len(), 1, "Exactly one registration should succeed");

    let found = store.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, created[0].id);
}

#[tokio::test]
async fn test_update_moves_email_claim() {
    require_emulator!();

    let store = test_firestore().await;
    let old_email = unique_email("move-old");
    let new_email = unique_email("move-new");
    let user = store.create_user(&old_email, "h").await.unwrap();

    store
        .update_user(user.id, &new_email, "h2")
        .await
        .unwrap()
        .unwrap();

    assert!(store.find_user_by_email(&old_email).await.unwrap().is_none());
    assert_eq!(
        store.find_user_by_email(&new_email).await.unwrap().unwrap().id,
        user.id
    );

    // The old address can be registered again
    store.create_user(&old_email, "h3").await.unwrap();

    // But the new one cannot be taken by someone else
    let other = store.create_user(&unique_email("move-other"), "h").await.unwrap();
    let err = store
        .update_user(other.id, &new_email, "h4")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)), "got {:?}", err);
}

// ═══════════════════════════════════════════════════════════════════════════
// CHIRP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_chirp_lifecycle() {
    require_emulator!();

    let store = test_firestore().await;
    let owner = store.create_user(&unique_email("owner"), "h").await.unwrap();
    let other = store.create_user(&unique_email("other"), "h").await.unwrap();

    let first = store.create_chirp("first", owner.id).await.unwrap();
    let second = store.create_chirp("second", owner.id).await.unwrap();

    let found = store.find_chirp_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(found.body, "first");
    assert_eq!(found.user_id, owner.id);

    let all = store.list_chirps().await.unwrap();
    let pos_first = all.iter().position(|c| c.id == first.id).unwrap();
    let pos_second = all.iter().position(|c| c.id == second.id).unwrap();
    assert!(pos_first < pos_second, "Chirps should be oldest first");

    // Not the owner
    let err = store.delete_chirp(first.id, other.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound), "got {:?}", err);
    assert!(store.find_chirp_by_id(first.id).await.unwrap().is_some());

    store.delete_chirp(first.id, owner.id).await.unwrap();
    assert!(store.find_chirp_by_id(first.id).await.unwrap().is_none());
}
