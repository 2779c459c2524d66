//! HTTP request handlers (route handlers).

/// Access key JSON API
pub mod access_keys;
/// Service health endpoint
pub mod health;
/// Access key generator page
pub mod study;
