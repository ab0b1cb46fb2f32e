//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::Serialize;
use tokio::time::Instant;

use crate::cache::Expiration;

// == Cache Entry ==
/// Represents a single cache entry: the stored value and when it expires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Remaining lifetime in milliseconds when serialized, null = no expiration
    #[serde(rename = "ttl_ms")]
    pub expiration: Expiration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with an already resolved expiration.
    pub fn new(value: V, expiration: Expiration) -> Self {
        Self { value, expiration }
    }

    // == Is Expired ==
    /// Checks if the entry has expired relative to `now`.
    ///
    /// Boundary condition: an entry is expired when `now` is greater than or
    /// equal to its expiration instant. Entries without expiration never are.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expiration.is_expired_at(now)
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Whether this entry can be removed by a purge at all.
    pub fn expires(&self) -> bool {
        self.expiration != Expiration::Never
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_entry_no_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), Expiration::Never);

        assert_eq!(entry.value, "test_value");
        assert!(!entry.expires());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_expiration() {
        let now = Instant::now();
        let entry = CacheEntry::new(7u32, Expiration::after(now, Some(Duration::from_secs(60))));

        assert!(entry.expires());
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_secs(61)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new("test", Expiration::At(now));

        // Entry should be expired when current time >= expiration
        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
    }

    #[test]
    fn test_entry_serializes_remaining_ttl() {
        let entry = CacheEntry::new("v", Expiration::Never);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["value"], "v");
        assert!(json["ttl_ms"].is_null());
    }
}
