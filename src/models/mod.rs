//! Data models for access keys and their API request/response types.

/// Access key model, status derivation and API payloads
pub mod access_key;
