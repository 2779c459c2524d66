//! Access key persistence.
//!
//! The store holds at most one record per owner. Writing a record for an
//! owner that already has one replaces it, which is how a newly generated
//! key supersedes the previous one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{error::AppError, models::access_key::StoredAccessKey};

pub use memory::MemoryKeyStore;
pub use postgres::PgKeyStore;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert or replace the owner's key in one atomic write.
    ///
    /// Returns the record as stored.
    async fn upsert(&self, record: StoredAccessKey) -> Result<StoredAccessKey, AppError>;

    async fn find_by_owner(
        &self,
        owner_reference: &str,
    ) -> Result<Option<StoredAccessKey>, AppError>;

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<StoredAccessKey>, AppError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Store whose every call fails, for exercising the storage error path.
    pub struct FailingKeyStore;

    fn unavailable() -> AppError {
        AppError::Storage("key store unavailable".to_string())
    }

    #[async_trait]
    impl KeyStore for FailingKeyStore {
        async fn upsert(&self, _record: StoredAccessKey) -> Result<StoredAccessKey, AppError> {
            Err(unavailable())
        }

        async fn find_by_owner(
            &self,
            _owner_reference: &str,
        ) -> Result<Option<StoredAccessKey>, AppError> {
            Err(unavailable())
        }

        async fn find_by_hash(
            &self,
            _key_hash: &str,
        ) -> Result<Option<StoredAccessKey>, AppError> {
            Err(unavailable())
        }

        async fn ping(&self) -> Result<(), AppError> {
            Err(unavailable())
        }
    }
}
