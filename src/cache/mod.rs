//! Cache Module
//!
//! Provides the concurrent entry store with per-entry TTL expiration.

mod entry;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{EvictionListener, Store};
pub use ttl::{Expiration, Ttl, DEFAULT_EXPIRATION, NO_EXPIRATION};
