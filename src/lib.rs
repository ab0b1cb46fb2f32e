//! TTL Cache - An in-process key-value cache with per-entry expiration
//!
//! Entries expire lazily on read and are reclaimed by a background janitor.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;
pub mod ttl_cache;

pub use cache::{CacheEntry, CacheStats, Expiration, Ttl, DEFAULT_EXPIRATION, NO_EXPIRATION};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::JanitorState;
pub use ttl_cache::{Cache, CacheBuilder};
