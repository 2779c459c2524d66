//! HTTP middleware components.

/// Owner resolution middleware
pub mod owner;
