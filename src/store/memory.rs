//! In-memory key store.
//!
//! Used when `DATABASE_URL` is not set, and by tests. Keys do not survive a
//! restart.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{error::AppError, models::access_key::StoredAccessKey};

use super::KeyStore;

/// Keys indexed by owner reference.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, StoredAccessKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error() -> AppError {
    AppError::Storage("Failed to acquire key store lock".to_string())
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn upsert(&self, record: StoredAccessKey) -> Result<StoredAccessKey, AppError> {
        let mut keys = self.keys.write().map_err(|_| lock_error())?;

        // Keep the existing row id, as the database upsert does.
        let stored = match keys.get(&record.owner_reference) {
            Some(existing) => StoredAccessKey {
                id: existing.id,
                ..record
            },
            None => record,
        };

        keys.insert(stored.owner_reference.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_owner(
        &self,
        owner_reference: &str,
    ) -> Result<Option<StoredAccessKey>, AppError> {
        let keys = self.keys.read().map_err(|_| lock_error())?;
        Ok(keys.get(owner_reference).cloned())
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<StoredAccessKey>, AppError> {
        let keys = self.keys.read().map_err(|_| lock_error())?;
        Ok(keys.values().find(|k| k.key_hash == key_hash).cloned())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
