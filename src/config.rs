//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default TTL in seconds for entries written with the default marker, 0 = never expire
    pub default_ttl: u64,
    /// Janitor interval in seconds, 0 = no janitor
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_u64("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: env_u64("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// The default expiration as the cache constructor expects it.
    pub fn default_expiration(&self) -> Option<Duration> {
        non_zero_secs(self.default_ttl)
    }

    /// The janitor interval as the cache constructor expects it.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        non_zero_secs(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            cleanup_interval: 600,
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.cleanup_interval, 600);
        assert_eq!(config.default_expiration(), Some(Duration::from_secs(300)));
        assert_eq!(config.cleanup_interval(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_means_disabled() {
        let config = Config {
            default_ttl: 0,
            cleanup_interval: 0,
        };
        assert_eq!(config.default_expiration(), None);
        assert_eq!(config.cleanup_interval(), None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_TTL");
        env::remove_var("CLEANUP_INTERVAL");

        assert_eq!(Config::from_env(), Config::default());
    }
}
