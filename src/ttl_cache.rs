//! Cache Facade
//!
//! `Cache<V>` wires one shared store to an optional janitor and resolves TTL
//! markers against the cache-level default before anything reaches the store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionListener, Expiration, Store, Ttl};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{Janitor, JanitorState};

// == Cache ==
/// A concurrent in-memory cache with per-entry expiration.
///
/// Cloning is cheap and every clone shares the same entries. When the last
/// clone is dropped the janitor task, if any, is aborted.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Cache, DEFAULT_EXPIRATION, NO_EXPIRATION};
///
/// // No cleanup interval, so no runtime is needed.
/// let cache: Cache<String> = Cache::new(Some(Duration::from_secs(300)), None).unwrap();
///
/// cache.set("foo", "bar".to_string(), DEFAULT_EXPIRATION);
/// cache.set("baz", "lightning".to_string(), NO_EXPIRATION);
///
/// assert_eq!(cache.get("foo").as_deref(), Some("bar"));
/// assert_eq!(cache.count(), 2);
/// ```
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

struct CacheInner<V> {
    store: Arc<Store<V>>,
    /// None = entries written with `Ttl::Default` never expire
    default_expiration: Option<Duration>,
    janitor: Option<Janitor>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("store", &self.inner.store)
            .field("default_expiration", &self.inner.default_expiration)
            .field("janitor", &self.inner.janitor)
            .finish()
    }
}

impl<V: Clone + Send + Sync + 'static> Cache<V> {
    // == Constructor ==
    /// Creates a cache.
    ///
    /// # Arguments
    /// * `default_expiration` - Lifetime of entries written with
    ///   `DEFAULT_EXPIRATION`; None means they never expire
    /// * `cleanup_interval` - How often the janitor purges expired entries;
    ///   None or zero disables the janitor
    ///
    /// # Errors
    /// `InvalidConfig` for a zero default expiration, `NoRuntime` when a
    /// janitor is requested outside a Tokio runtime.
    pub fn new(default_expiration: Option<Duration>, cleanup_interval: Option<Duration>) -> Result<Self> {
        CacheBuilder {
            default_expiration,
            cleanup_interval,
            ..CacheBuilder::new()
        }
        .build()
    }

    /// Returns a builder for the remaining options.
    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.default_expiration(), config.cleanup_interval())
    }

    fn expiration_for(&self, ttl: Ttl) -> Expiration {
        let now = Instant::now();
        match ttl {
            Ttl::Default => Expiration::after(now, self.inner.default_expiration),
            Ttl::Never => Expiration::Never,
            Ttl::After(lifetime) => Expiration::after(now, Some(lifetime)),
        }
    }

    // == Writes ==
    /// Inserts or overwrites the entry for `key`.
    ///
    /// A `Ttl::After(Duration::ZERO)` entry is stored already expired.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Ttl) {
        self.inner.store.set(key, value, self.expiration_for(ttl));
    }

    /// Inserts only if `key` has no live entry.
    ///
    /// # Errors
    /// `KeyExists` if a live entry is present.
    pub fn add(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        self.inner.store.add(key, value, self.expiration_for(ttl))
    }

    /// Overwrites only if `key` has a live entry.
    ///
    /// # Errors
    /// `NotFound` if the key is absent or expired.
    pub fn replace(&self, key: &str, value: V, ttl: Ttl) -> Result<()> {
        self.inner.store.replace(key, value, self.expiration_for(ttl))
    }

    // == Reads ==
    /// Returns the value for `key` if present and not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.store.get(key)
    }

    /// Returns the value for `key` together with its expiration.
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Expiration)> {
        self.inner.store.get_with_expiration(key)
    }

    /// Returns a copy of every live entry.
    pub fn items(&self) -> HashMap<String, CacheEntry<V>> {
        self.inner.store.items()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn count(&self) -> usize {
        self.inner.store.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.store.stats()
    }

    // == Removal ==
    /// Removes `key`, returning its value if it was stored.
    pub fn delete(&self, key: &str) -> Option<V> {
        self.inner.store.delete(key)
    }

    /// Purges expired entries now, returning how many were removed.
    pub fn delete_expired(&self) -> usize {
        self.inner.store.purge(Instant::now())
    }

    /// Removes every entry.
    pub fn flush(&self) {
        self.inner.store.flush();
    }
}

impl<V> Cache<V> {
    // == Janitor Lifecycle ==
    /// Stops the janitor. Idempotent and a no-op without a janitor.
    pub fn stop_janitor(&self) {
        if let Some(janitor) = &self.inner.janitor {
            janitor.stop();
        }
    }

    /// None when the cache was built without cleanup.
    pub fn janitor_state(&self) -> Option<JanitorState> {
        self.inner.janitor.as_ref().map(Janitor::state)
    }

    pub fn default_expiration(&self) -> Option<Duration> {
        self.inner.default_expiration
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.inner.janitor.as_ref().map(Janitor::interval)
    }
}

// == Cache Builder ==
/// Builds a [`Cache`] with optional runtime and eviction listener.
pub struct CacheBuilder<V> {
    default_expiration: Option<Duration>,
    cleanup_interval: Option<Duration>,
    runtime: Option<Handle>,
    listener: Option<EvictionListener<V>>,
}

impl<V> Default for CacheBuilder<V> {
    fn default() -> Self {
        Self {
            default_expiration: None,
            cleanup_interval: None,
            runtime: None,
            listener: None,
        }
    }
}

impl<V: Clone + Send + Sync + 'static> CacheBuilder<V> {
    /// Starts with no default expiration and no janitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime applied to entries written with `DEFAULT_EXPIRATION`.
    pub fn default_expiration(mut self, lifetime: Duration) -> Self {
        self.default_expiration = Some(lifetime);
        self
    }

    pub fn no_default_expiration(mut self) -> Self {
        self.default_expiration = None;
        self
    }

    /// Enables the janitor. A zero interval disables it again.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Runtime to spawn the janitor on instead of the ambient one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Observer for entries removed by `delete` or by a purge.
    pub fn on_evicted<F>(mut self, listener: F) -> Self
    where
        F: Fn(&str, &V) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    // == Build ==
    /// Validates the configuration and starts the janitor if requested.
    pub fn build(self) -> Result<Cache<V>> {
        if self.default_expiration == Some(Duration::ZERO) {
            return Err(CacheError::InvalidConfig(
                "default expiration must be positive; use None for no expiration".to_string(),
            ));
        }

        let store = Arc::new(match self.listener {
            Some(listener) => Store::with_listener(listener),
            None => Store::new(),
        });

        let janitor = match self.cleanup_interval.filter(|interval| !interval.is_zero()) {
            Some(interval) => {
                let runtime = match self.runtime {
                    Some(handle) => handle,
                    None => Handle::try_current().map_err(|_| CacheError::NoRuntime)?,
                };
                let janitor = Janitor::new(interval);
                janitor.start(&runtime, Arc::downgrade(&store))?;
                Some(janitor)
            }
            None => None,
        };

        debug!(
            "Cache created: default_expiration={:?}, cleanup_interval={:?}",
            self.default_expiration,
            janitor.as_ref().map(Janitor::interval)
        );

        Ok(Cache {
            inner: Arc::new(CacheInner {
                store,
                default_expiration: self.default_expiration,
                janitor,
            }),
        })
    }
}
