//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.

pub mod access_key_service;

pub use access_key_service::AccessKeyService;
