//! Cache Store Module
//!
//! The concurrent entry store: a HashMap behind a single reader-writer lock,
//! with lazy expiration on reads and an explicit purge for the janitor.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::warn;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Expiration};
use crate::error::{CacheError, Result};

/// Callback invoked with the key and value of every entry removed by
/// `delete` or `purge`.
pub type EvictionListener<V> = Arc<dyn Fn(&str, &V) + Send + Sync>;

// == Store ==
/// Thread-safe key-value storage with per-entry expiration.
///
/// `get` takes the read lock, so lookups run in parallel. Every mutation
/// takes the write lock for the duration of a single map operation. The
/// store never resolves TTL markers: it only sees `Expiration` values.
pub struct Store<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Performance statistics
    stats: StatsCounters,
    /// Optional removal observer, fixed at construction
    listener: Option<EvictionListener<V>>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
            listener: None,
        }
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.entries.read().len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<V: Clone> Store<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that reports removals to `listener`.
    pub fn with_listener(listener: EvictionListener<V>) -> Self {
        Self {
            listener: Some(listener),
            ..Self::default()
        }
    }

    // == Set ==
    /// Inserts or overwrites the entry for `key`.
    ///
    /// Any previous value for the key is discarded without notifying the
    /// eviction listener.
    pub fn set(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        self.entries
            .write()
            .insert(key.into(), CacheEntry::new(value, expiration));
    }

    // == Add ==
    /// Inserts only if there is no live entry for `key`.
    ///
    /// An expired entry that has not been purged yet counts as absent and is
    /// overwritten.
    pub fn add(&self, key: impl Into<String>, value: V, expiration: Expiration) -> Result<()> {
        let key = key.into();
        let now = Instant::now();
        let mut entries = self.entries.write();

        if matches!(entries.get(&key), Some(entry) if !entry.is_expired_at(now)) {
            return Err(CacheError::KeyExists(key));
        }

        entries.insert(key, CacheEntry::new(value, expiration));
        Ok(())
    }

    // == Replace ==
    /// Overwrites only if there is a live entry for `key`.
    pub fn replace(&self, key: &str, value: V, expiration: Expiration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                *entry = CacheEntry::new(value, expiration);
                Ok(())
            }
            _ => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Get ==
    /// Retrieves a copy of the value for `key`.
    ///
    /// Returns None if the key is absent or its entry has expired. Expired
    /// entries are left in place for the next purge.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_expiration(key).map(|(value, _)| value)
    }

    /// Like [`Store::get`], also returning the entry's expiration.
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Expiration)> {
        let now = Instant::now();
        let found = {
            let entries = self.entries.read();
            entries
                .get(key)
                .filter(|entry| !entry.is_expired_at(now))
                .map(|entry| (entry.value.clone(), entry.expiration))
        };

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    // == Delete ==
    /// Removes the entry for `key` if present, returning its value.
    pub fn delete(&self, key: &str) -> Option<V> {
        let removed = self.entries.write().remove(key)?;

        if let Some(listener) = &self.listener {
            notify(listener, key, &removed.value);
        }
        Some(removed.value)
    }

    // == Purge ==
    /// Removes every entry that expires and whose expiration is at or before
    /// `now`.
    ///
    /// Returns the number of entries removed. The eviction listener runs
    /// after the lock is released.
    pub fn purge(&self, now: Instant) -> usize {
        let mut evicted = Vec::new();

        let count = {
            let mut entries = self.entries.write();
            let expired_keys: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();

            let count = expired_keys.len();
            for key in expired_keys {
                if let Some(entry) = entries.remove(&key) {
                    if self.listener.is_some() {
                        evicted.push((key, entry.value));
                    }
                }
            }
            count
        };

        self.stats.record_expired(count);
        if let Some(listener) = &self.listener {
            for (key, value) in &evicted {
                notify(listener, key, value);
            }
        }
        count
    }

    // == Items ==
    /// Returns a copy of every live entry.
    pub fn items(&self) -> HashMap<String, CacheEntry<V>> {
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Flush ==
    /// Removes every entry without notifying the eviction listener.
    pub fn flush(&self) {
        self.entries.write().clear();
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones that
    /// have not been purged yet.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }
}

/// Runs the listener, containing any panic it raises.
fn notify<V>(listener: &EvictionListener<V>, key: &str, value: &V) {
    if panic::catch_unwind(AssertUnwindSafe(|| listener(key, value))).is_err() {
        warn!(key, "Eviction listener panicked; continuing");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn expires_in(secs: u64) -> Expiration {
        Expiration::after(Instant::now(), Some(Duration::from_secs(secs)))
    }

    #[test]
    fn test_store_new() {
        let store: Store<String> = Store::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = Store::new();

        store.set("key1", "value1".to_string(), Expiration::Never);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: Store<String> = Store::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let store = Store::new();

        store.set("key1", 1u32, Expiration::Never);

        assert_eq!(store.delete("key1"), Some(1));
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let store: Store<u32> = Store::new();
        assert_eq!(store.delete("nonexistent"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let store = Store::new();

        store.set("key1", "value1", expires_in(60));
        store.set("key1", "value2", Expiration::Never);

        assert_eq!(store.get_with_expiration("key1"), Some(("value2", Expiration::Never)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_expired_entry_is_invisible_but_counted() {
        let store = Store::new();

        store.set("stale", "v", Expiration::At(Instant::now()));

        assert!(store.get("stale").is_none());
        assert_eq!(store.len(), 1, "get must not remove the entry");
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_store_purge_removes_only_expired() {
        let store = Store::new();
        let now = Instant::now();

        store.set("past", 1, Expiration::At(now - Duration::from_secs(1)));
        store.set("boundary", 2, Expiration::At(now));
        store.set("future", 3, Expiration::At(now + Duration::from_secs(1)));
        store.set("never", 4, Expiration::Never);

        assert_eq!(store.purge(now), 2);
        assert_eq!(store.len(), 2);
        assert!(store.items().contains_key("future"));
        assert!(store.items().contains_key("never"));
        assert_eq!(store.stats().expired, 2);
    }

    #[test]
    fn test_store_purge_far_future_keeps_never() {
        let store = Store::new();

        store.set("short", "a", expires_in(1));
        store.set("long", "b", expires_in(3600));
        store.set("forever", "c", Expiration::Never);

        let removed = store.purge(Instant::now() + Duration::from_secs(86_400));
        assert_eq!(removed, 2);
        assert_eq!(store.get("forever"), Some("c"));
    }

    #[test]
    fn test_store_add() {
        let store = Store::new();

        tokio_test::assert_ok!(store.add("key", 1, Expiration::Never));
        assert_eq!(
            store.add("key", 2, Expiration::Never),
            Err(CacheError::KeyExists("key".to_string()))
        );
        assert_eq!(store.get("key"), Some(1));
    }

    #[test]
    fn test_store_add_over_expired_entry() {
        let store = Store::new();

        store.set("key", 1, Expiration::At(Instant::now()));
        tokio_test::assert_ok!(store.add("key", 2, Expiration::Never));
        assert_eq!(store.get("key"), Some(2));
    }

    #[test]
    fn test_store_replace() {
        let store = Store::new();

        assert_eq!(
            store.replace("key", 1, Expiration::Never),
            Err(CacheError::NotFound("key".to_string()))
        );

        store.set("key", 1, Expiration::Never);
        tokio_test::assert_ok!(store.replace("key", 2, expires_in(60)));
        assert_eq!(store.get("key"), Some(2));

        store.set("stale", 1, Expiration::At(Instant::now()));
        tokio_test::assert_err!(store.replace("stale", 2, Expiration::Never));
    }

    #[test]
    fn test_store_flush() {
        let store = Store::new();

        store.set("a", 1, Expiration::Never);
        store.set("b", 2, expires_in(60));
        store.flush();

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let store = Store::new();

        store.set("key1", "value1", Expiration::Never);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_listener_sees_delete_and_purge() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let store = Store::with_listener(Arc::new(move |key: &str, value: &u32| {
            sink.lock().unwrap().push((key.to_string(), *value));
        }));
        let now = Instant::now();

        store.set("deleted", 1, Expiration::Never);
        store.set("expired", 2, Expiration::At(now));
        store.set("kept", 3, Expiration::Never);

        store.delete("deleted");
        store.delete("missing");
        store.purge(now);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![("deleted".to_string(), 1), ("expired".to_string(), 2)]
        );
    }

    #[test]
    fn test_panicking_listener_does_not_break_purge() {
        let store = Store::with_listener(Arc::new(|_: &str, _: &u32| panic!("observer failure")));
        let now = Instant::now();

        store.set("a", 1, Expiration::At(now));
        store.set("b", 2, Expiration::At(now));

        assert_eq!(store.purge(now), 2);
        assert!(store.is_empty());

        // The lock is still usable afterwards.
        store.set("c", 3, Expiration::Never);
        assert_eq!(store.get("c"), Some(3));
    }
}
