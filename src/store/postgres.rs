//! PostgreSQL key store.

use async_trait::async_trait;

use crate::{db::DbPool, error::AppError, models::access_key::StoredAccessKey};

use super::KeyStore;

#[derive(Debug, Clone)]
pub struct PgKeyStore {
    pool: DbPool,
}

impl PgKeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyStore for PgKeyStore {
    async fn upsert(&self, record: StoredAccessKey) -> Result<StoredAccessKey, AppError> {
        // ON CONFLICT makes concurrent submissions for one owner last-write-wins.
        // The row id is kept so the owner's row stays stable across regenerations.
        let stored = sqlx::query_as::<_, StoredAccessKey>(
            r#"
            INSERT INTO access_keys (id, owner_reference, key_hash, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (owner_reference) DO UPDATE
            SET key_hash = EXCLUDED.key_hash,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at
            RETURNING id, owner_reference, key_hash, issued_at, expires_at
            "#,
        )
        .bind(record.id)
        .bind(&record.owner_reference)
        .bind(&record.key_hash)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_by_owner(
        &self,
        owner_reference: &str,
    ) -> Result<Option<StoredAccessKey>, AppError> {
        let record = sqlx::query_as::<_, StoredAccessKey>(
            r#"
            SELECT id, owner_reference, key_hash, issued_at, expires_at
            FROM access_keys
            WHERE owner_reference = $1
            "#,
        )
        .bind(owner_reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<StoredAccessKey>, AppError> {
        let record = sqlx::query_as::<_, StoredAccessKey>(
            r#"
            SELECT id, owner_reference, key_hash, issued_at, expires_at
            FROM access_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
