//! TTL Module
//!
//! Caller-facing time-to-live markers and the resolved expiration they turn into.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

// == Ttl ==
/// How long an entry written with `set`, `add` or `replace` should live.
///
/// The two markers are separate variants, so no duration value can be
/// mistaken for "use the default" or "never expire".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Use the cache-level default expiration
    Default,
    /// The entry never expires
    Never,
    /// The entry expires this long after it is written
    After(Duration),
}

/// Use the cache's configured default expiration.
pub const DEFAULT_EXPIRATION: Ttl = Ttl::Default;

/// The entry is only removed by an explicit delete or overwrite.
pub const NO_EXPIRATION: Ttl = Ttl::Never;

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::After(duration)
    }
}

// == Expiration ==
/// A resolved point of expiry, as stored with every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Never purged
    Never,
    /// Expired once the clock reaches this instant
    At(Instant),
}

impl Expiration {
    /// Resolves a relative lifetime against `now`.
    ///
    /// `None` means no expiration. A lifetime too large to represent as an
    /// instant is treated as never expiring.
    pub fn after(now: Instant, lifetime: Option<Duration>) -> Self {
        match lifetime.and_then(|d| now.checked_add(d)) {
            Some(at) => Expiration::At(at),
            None => Expiration::Never,
        }
    }

    /// An entry is expired once `now` is at or past its expiration instant.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self {
            Expiration::Never => false,
            Expiration::At(at) => *at <= now,
        }
    }

    /// Returns remaining lifetime, or None if the entry never expires.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self {
            Expiration::Never => None,
            Expiration::At(at) => Some(at.saturating_duration_since(now)),
        }
    }
}

impl Serialize for Expiration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Instants are process-local, so expose what is left of the lifetime.
        match self.remaining_at(Instant::now()) {
            None => serializer.serialize_none(),
            Some(remaining) => serializer.serialize_some(&(remaining.as_millis() as u64)),
        }
    }
}
