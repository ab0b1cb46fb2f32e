//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Reads, writes and purges never fail; absence is reported as `None`.
/// Only construction and the conditional writes can return an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cleanup was requested but there is no runtime to run the janitor on
    #[error("No Tokio runtime available to drive the janitor")]
    NoRuntime,

    /// `add` found a live entry for the key
    #[error("Key already exists: {0}")]
    KeyExists(String),

    /// `replace` found no live entry for the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The janitor was already started or has been stopped
    #[error("Janitor is not idle and cannot be started")]
    JanitorUnavailable,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
