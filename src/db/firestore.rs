// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (keyed by user ID)
//! - Email claims (keyed by hex-encoded email; one per user)
//! - Refresh tokens (keyed by the token value)
//! - Chirps (keyed by chirp ID)
//!
//! Every check-then-write runs its reads inside the write transaction, so
//! Firestore aborts one of two conflicting commits.

use crate::db::{collections, DbError, Store};
use crate::models::{Chirp, RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::{FirestoreConsistencySelector, FirestoreTransaction};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

// Commits aborted by a concurrent transaction are re-run this many times in
// total; the re-run's reads observe the winner's write.
const COMMIT_ATTEMPTS: u32 = 5;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

fn backend(e: impl std::fmt::Display) -> DbError {
    DbError::Backend(e.to_string())
}

/// Reservation of an email address by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmailClaim {
    email: String,
    user_id: Uuid,
}

/// Document ID for an email claim. Emails may contain `/`, which Firestore
/// does not allow in IDs.
fn email_doc_id(email: &str) -> String {
    hex::encode(email.as_bytes())
}

/// Log an aborted commit and decide whether another attempt is allowed.
fn retry_after_abort(attempt: u32, op: &str, err: impl std::fmt::Display) -> Result<(), DbError> {
    if attempt >= COMMIT_ATTEMPTS {
        return Err(DbError::Backend(format!("Transaction commit failed: {}", err)));
    }
    tracing::debug!(attempt, op, error = %err, "Transaction aborted, retrying");
    Ok(())
}

async fn read_doc<T>(
    db: &firestore::FirestoreDb,
    collection: &str,
    id: &str,
) -> Result<Option<T>, DbError>
where
    T: DeserializeOwned + Send,
{
    db.fluent()
        .select()
        .by_id_in(collection)
        .obj()
        .one(id)
        .await
        .map_err(backend)
}

/// Firestore-backed [`Store`].
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, DbError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| DbError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, DbError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            DbError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Helper Methods ────────────────────────────────────────────

    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned + Send,
    {
        read_doc(&self.client, collection, id).await
    }

    async fn begin(&self) -> Result<FirestoreTransaction<'_>, DbError> {
        self.client
            .begin_transaction()
            .await
            .map_err(|e| DbError::Backend(format!("Failed to begin transaction: {}", e)))
    }

    /// A client whose reads join `transaction`.
    fn reader_for(&self, transaction: &FirestoreTransaction<'_>) -> firestore::FirestoreDb {
        self.client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
    }

    async fn put<T>(&self, collection: &str, id: &str, object: &T) -> Result<(), DbError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    fn put_in<T>(
        &self,
        transaction: &mut FirestoreTransaction<'_>,
        collection: &str,
        id: &str,
        object: &T,
    ) -> Result<(), DbError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .add_to_transaction(transaction)
            .map_err(|e| {
                DbError::Backend(format!(
                    "Failed to add write to transaction for {}: {}",
                    collection, e
                ))
            })?;
        Ok(())
    }

    fn delete_in(
        &self,
        transaction: &mut FirestoreTransaction<'_>,
        collection: &str,
        id: &str,
    ) -> Result<(), DbError> {
        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .add_to_transaction(transaction)
            .map_err(|e| {
                DbError::Backend(format!(
                    "Failed to add deletion to transaction for {}: {}",
                    collection, e
                ))
            })?;
        Ok(())
    }

    async fn email_claim(&self, email: &str) -> Result<Option<EmailClaim>, DbError> {
        self.get_by_id(collections::USER_EMAILS, &email_doc_id(email))
            .await
    }

    /// Delete every document in a collection, in transactional batches.
    async fn clear_collection<T, F>(&self, collection: &str, id_extractor: F) -> Result<usize, DbError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&T) -> String,
    {
        let items: Vec<T> = self
            .client
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(backend)?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self.begin().await?;

            for item in chunk {
                self.delete_in(&mut transaction, collection, &id_extractor(item))?;
            }

            transaction.commit().await.map_err(|e| {
                DbError::Backend(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(items.len())
    }
}

#[async_trait]
impl Store for FirestoreStore {
    // ─── User Operations ─────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let Some(claim) = self.email_claim(email).await? else {
            return Ok(None);
        };
        self.find_user_by_id(claim.user_id).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        self.get_by_id(collections::USERS, &id.to_string()).await
    }

    /// The email claim and the user are written in one transaction whose
    /// read of the claim makes a concurrent registration abort.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DbError> {
        let claim_id = email_doc_id(email);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut transaction = self.begin().await?;
            let reader = self.reader_for(&transaction);

            let existing: Option<EmailClaim> =
                read_doc(&reader, collections::USER_EMAILS, &claim_id).await?;
            if existing.is_some() {
                let _ = transaction.rollback().await;
                return Err(DbError::Conflict(format!(
                    "email {email} is already registered"
                )));
            }

            let user = User::new(email.to_string(), hashed_password.to_string());
            let claim = EmailClaim {
                email: email.to_string(),
                user_id: user.id,
            };
            self.put_in(&mut transaction, collections::USER_EMAILS, &claim_id, &claim)?;
            self.put_in(&mut transaction, collections::USERS, &user.id.to_string(), &user)?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(user_id = %user.id, "Created user");
                    return Ok(user);
                }
                Err(e) => retry_after_abort(attempt, "create_user", e)?,
            }
        }
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, DbError> {
        let doc_id = id.to_string();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut transaction = self.begin().await?;
            let reader = self.reader_for(&transaction);

            let current: Option<User> = read_doc(&reader, collections::USERS, &doc_id).await?;
            let Some(mut user) = current else {
                let _ = transaction.rollback().await;
                return Ok(None);
            };

            if user.email != email {
                let taken: Option<EmailClaim> =
                    read_doc(&reader, collections::USER_EMAILS, &email_doc_id(email)).await?;
                if taken.is_some_and(|claim| claim.user_id != id) {
                    let _ = transaction.rollback().await;
                    return Err(DbError::Conflict(format!(
                        "email {email} is already registered"
                    )));
                }

                let claim = EmailClaim {
                    email: email.to_string(),
                    user_id: id,
                };
                self.delete_in(
                    &mut transaction,
                    collections::USER_EMAILS,
                    &email_doc_id(&user.email),
                )?;
                self.put_in(
                    &mut transaction,
                    collections::USER_EMAILS,
                    &email_doc_id(email),
                    &claim,
                )?;
            }

            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            self.put_in(&mut transaction, collections::USERS, &doc_id, &user)?;

            match transaction.commit().await {
                Ok(_) => return Ok(Some(user)),
                Err(e) => retry_after_abort(attempt, "update_user", e)?,
            }
        }
    }

    // ─── Refresh Token Operations ────────────────────────────────

    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let row = RefreshToken::new(token.to_string(), user_id, expires_at);
        self.put(collections::REFRESH_TOKENS, token, &row).await
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DbError> {
        self.get_by_id(collections::REFRESH_TOKENS, token).await
    }

    /// Conditional update: the row is read inside the transaction, so of two
    /// racing revocations Firestore commits one and aborts the other. The
    /// loser's re-run sees the revocation and reports `Conflict`.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut transaction = self.begin().await?;
            let reader = self.reader_for(&transaction);

            let current: Option<RefreshToken> =
                read_doc(&reader, collections::REFRESH_TOKENS, token).await?;

            let Some(mut row) = current else {
                let _ = transaction.rollback().await;
                return Err(DbError::NotFound);
            };

            if row.revoked_at.is_some() {
                let _ = transaction.rollback().await;
                return Err(DbError::Conflict("refresh token already revoked".into()));
            }

            let now = Utc::now();
            row.revoked_at = Some(now);
            row.updated_at = now;
            self.put_in(&mut transaction, collections::REFRESH_TOKENS, token, &row)?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(user_id = %row.user_id, "Refresh token revoked");
                    return Ok(());
                }
                Err(e) => retry_after_abort(attempt, "revoke_refresh_token", e)?,
            }
        }
    }

    // ─── Chirp Operations ────────────────────────────────────────

    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, DbError> {
        let chirp = Chirp::new(body.to_string(), user_id);
        self.put(collections::CHIRPS, &chirp.id.to_string(), &chirp)
            .await?;
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DbError> {
        let mut chirps: Vec<Chirp> = self
            .client
            .fluent()
            .select()
            .from(collections::CHIRPS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(backend)?;

        // Stored timestamps are strings; re-sort on the parsed values.
        chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(chirps)
    }

    async fn find_chirp_by_id(&self, id: Uuid) -> Result<Option<Chirp>, DbError> {
        self.get_by_id(collections::CHIRPS, &id.to_string()).await
    }

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<(), DbError> {
        let doc_id = id.to_string();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut transaction = self.begin().await?;
            let reader = self.reader_for(&transaction);

            let chirp: Option<Chirp> = read_doc(&reader, collections::CHIRPS, &doc_id).await?;
            if !chirp.is_some_and(|c| c.user_id == user_id) {
                let _ = transaction.rollback().await;
                return Err(DbError::NotFound);
            }

            self.delete_in(&mut transaction, collections::CHIRPS, &doc_id)?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(chirp_id = %id, user_id = %user_id, "Deleted chirp");
                    return Ok(());
                }
                Err(e) => retry_after_abort(attempt, "delete_chirp", e)?,
            }
        }
    }

    // ─── Admin ───────────────────────────────────────────────────

    async fn reset(&self) -> Result<(), DbError> {
        let chirps = self
            .clear_collection(collections::CHIRPS, |c: &Chirp| c.id.to_string())
            .await?;
        let tokens = self
            .clear_collection(collections::REFRESH_TOKENS, |t: &RefreshToken| {
                t.token.clone()
            })
            .await?;
        let claims = self
            .clear_collection(collections::USER_EMAILS, |c: &EmailClaim| {
                email_doc_id(&c.email)
            })
            .await?;
        let users = self
            .clear_collection(collections::USERS, |u: &User| u.id.to_string())
            .await?;

        tracing::info!(chirps, tokens, claims, users, "Firestore store reset");
        Ok(())
    }
}
