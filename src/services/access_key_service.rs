//! Access key service - issuing and checking time-limited access keys.
//!
//! This service handles:
//! - Generating keys and persisting them, superseding the owner's previous key
//! - Deriving an owner's key status from the clock
//! - Verifying identifiers presented by gated content
//!
//! Each operation is a single read or a single write against the key store.
//! Clock-dependent lookups and generation also have an `_at` form that takes
//! the current time explicitly; the plain form reads the system clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::access_key::{AccessKey, KeyStatus, KeyStatusReport, StoredAccessKey, VerifiedKey},
    store::KeyStore,
};

#[derive(Clone)]
pub struct AccessKeyService {
    store: Arc<dyn KeyStore>,
}

impl AccessKeyService {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Generate a new 48-hour key for `owner_reference`.
    pub async fn generate_key(&self, owner_reference: &str) -> Result<AccessKey, AppError> {
        self.generate_key_at(owner_reference, Utc::now()).await
    }

    /// Generate a new key issued at `now`.
    ///
    /// # Process
    ///
    /// 1. Create a random identifier
    /// 2. Store its SHA-256 hash in one write, replacing any key the owner already holds
    /// 3. Return the key with its plaintext identifier (only time it's shown)
    ///
    /// Generating while a key is still active is allowed: the new key
    /// replaces it and the old identifier stops verifying.
    ///
    /// # Errors
    ///
    /// - `Database` / `Storage`: the write failed
    pub async fn generate_key_at(
        &self,
        owner_reference: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessKey, AppError> {
        let key = AccessKey::new(generate_identifier(), owner_reference.to_string(), now);
        let id = Uuid::new_v4();

        let stored = self
            .store
            .upsert(StoredAccessKey {
                id,
                owner_reference: key.owner_reference.clone(),
                key_hash: hash_identifier(&key.identifier),
                issued_at: key.issued_at,
                expires_at: key.expires_at,
            })
            .await?;

        // The store keeps an existing row's id, so a different id means a key was replaced.
        if stored.id != id {
            tracing::debug!(owner = owner_reference, "superseded previous access key");
        }

        tracing::info!(
            owner = owner_reference,
            expires_at = %key.expires_at,
            "access key generated"
        );

        Ok(key)
    }

    /// Status of the owner's most recent key.
    pub async fn get_status(&self, owner_reference: &str) -> Result<KeyStatus, AppError> {
        self.get_status_at(owner_reference, Utc::now()).await
    }

    pub async fn get_status_at(
        &self,
        owner_reference: &str,
        now: DateTime<Utc>,
    ) -> Result<KeyStatus, AppError> {
        Ok(self.status_report_at(owner_reference, now).await?.status)
    }

    /// Status of the owner's most recent key along with its timestamps.
    pub async fn status_report(&self, owner_reference: &str) -> Result<KeyStatusReport, AppError> {
        self.status_report_at(owner_reference, Utc::now()).await
    }

    pub async fn status_report_at(
        &self,
        owner_reference: &str,
        now: DateTime<Utc>,
    ) -> Result<KeyStatusReport, AppError> {
        let report = match self.store.find_by_owner(owner_reference).await? {
            Some(record) => KeyStatusReport::from_record(&record, now),
            None => KeyStatusReport::none(),
        };

        Ok(report)
    }

    /// Whether the owner currently holds an active key.
    pub async fn check_access(&self, owner_reference: &str) -> Result<bool, AppError> {
        Ok(self.get_status(owner_reference).await?.is_active())
    }

    /// Look up a presented identifier.
    ///
    /// Returns `None` for unknown, superseded, or expired keys.
    pub async fn verify_key(&self, identifier: &str) -> Result<Option<VerifiedKey>, AppError> {
        self.verify_key_at(identifier, Utc::now()).await
    }

    pub async fn verify_key_at(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerifiedKey>, AppError> {
        let verified = self
            .store
            .find_by_hash(&hash_identifier(identifier))
            .await?
            .filter(|record| record.status_at(now).is_active())
            .map(|record| VerifiedKey {
                owner_reference: record.owner_reference,
                expires_at: record.expires_at,
            });

        Ok(verified)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}

/// Generate a random key identifier.
///
/// # Output
///
/// `ak_` followed by 64 hex characters (32 random bytes)
fn generate_identifier() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("ak_{}", hex::encode(bytes))
}

/// SHA-256 hex digest of an identifier, as persisted in the key store.
fn hash_identifier(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hex::encode(hasher.finalize())
}
