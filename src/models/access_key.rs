//! Access key models.
//!
//! An access key grants its owner 48 hours of access to gated study content.
//! Only a SHA-256 hash of the key is persisted; the plaintext identifier is
//! handed out once, when the key is generated.
//!
//! A key's status is never stored. It is derived from the clock on every
//! read with [`status_at`], so an active key turns into an expired one
//! without any write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed lifetime of every access key.
pub const ACCESS_KEY_TTL: Duration = Duration::hours(48);

/// A freshly generated access key.
///
/// This is the only value that carries the plaintext `identifier`.
#[derive(Debug, Clone, Serialize)]
pub struct AccessKey {
    /// Opaque token handed to the owner (`ak_` followed by 64 hex characters)
    pub identifier: String,

    /// User or session the key was issued to
    pub owner_reference: String,

    pub issued_at: DateTime<Utc>,

    /// Always `issued_at + ACCESS_KEY_TTL`
    pub expires_at: DateTime<Utc>,
}

impl AccessKey {
    /// Build a key issued to `owner_reference` at `issued_at`.
    pub fn new(identifier: String, owner_reference: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            identifier,
            owner_reference,
            issued_at,
            expires_at: issued_at + ACCESS_KEY_TTL,
        }
    }
}

/// Represents an access key record from the key store.
///
/// # Database Table
///
/// Maps to the `access_keys` table. There is at most one row per owner:
/// generating a new key overwrites the owner's previous row, so the stored
/// record is always the owner's most recent key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredAccessKey {
    pub id: Uuid,

    pub owner_reference: String,

    /// SHA-256 hash of the plaintext identifier (64 hex characters)
    pub key_hash: String,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl StoredAccessKey {
    pub fn status_at(&self, now: DateTime<Utc>) -> KeyStatus {
        status_at(now, self.expires_at)
    }
}

/// Status of an owner's access key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// The owner has never been issued a key
    None,
    Active,
    Expired,
}

impl KeyStatus {
    pub fn is_active(self) -> bool {
        self == KeyStatus::Active
    }
}

/// Derive a key's status from the current time.
///
/// A key is active for every instant in `[issued_at, expires_at)` and expired
/// from `expires_at` onwards.
pub fn status_at(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> KeyStatus {
    if now < expires_at {
        KeyStatus::Active
    } else {
        KeyStatus::Expired
    }
}

/// Status of an owner's key together with the timestamps of the current record.
///
/// # JSON Example
///
/// ```json
/// {
///   "status": "active",
///   "issued_at": "2024-01-01T00:00:00Z",
///   "expires_at": "2024-01-03T00:00:00Z"
/// }
/// ```
///
/// Both timestamps are `null` when the status is `none`.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStatusReport {
    pub status: KeyStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl KeyStatusReport {
    pub fn none() -> Self {
        Self {
            status: KeyStatus::None,
            issued_at: None,
            expires_at: None,
        }
    }

    pub fn from_record(record: &StoredAccessKey, now: DateTime<Utc>) -> Self {
        Self {
            status: record.status_at(now),
            issued_at: Some(record.issued_at),
            expires_at: Some(record.expires_at),
        }
    }
}

/// Response body returned when a key is generated through the JSON API.
///
/// The identifier is only ever shown in this response.
#[derive(Debug, Serialize)]
pub struct GeneratedKeyResponse {
    pub identifier: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<AccessKey> for GeneratedKeyResponse {
    fn from(key: AccessKey) -> Self {
        Self {
            identifier: key.identifier,
            issued_at: key.issued_at,
            expires_at: key.expires_at,
        }
    }
}

/// Response body for the access check endpoint.
#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub has_access: bool,
}

/// Request to verify a presented access key.
///
/// # JSON Example
///
/// ```json
/// {
///   "identifier": "ak_3f9a..."
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct VerifyKeyRequest {
    pub identifier: String,
}

/// An identifier that matched an owner's current, active key.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedKey {
    pub owner_reference: String,
    pub expires_at: DateTime<Utc>,
}

/// Response body for key verification.
///
/// `owner_reference` and `expires_at` are omitted when the key is not valid.
#[derive(Debug, Serialize)]
pub struct VerifyKeyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Option<VerifiedKey>> for VerifyKeyResponse {
    fn from(verified: Option<VerifiedKey>) -> Self {
        match verified {
            Some(key) => Self {
                valid: true,
                owner_reference: Some(key.owner_reference),
                expires_at: Some(key.expires_at),
            },
            None => Self {
                valid: false,
                owner_reference: None,
                expires_at: None,
            },
        }
    }
}
