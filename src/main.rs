//! TTL Cache demo
//!
//! Walks through the basic cache operations and prints the results.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{Cache, Config, DEFAULT_EXPIRATION, NO_EXPIRATION};

/// Demo entry point.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Store one entry with the default expiration and one without
/// 4. Store shared handles in a second cache
/// 5. Print statistics and stop both janitors
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Defaults: entries expire after 5 minutes, purged every 10 minutes
    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, cleanup_interval={}s",
        config.default_ttl, config.cleanup_interval
    );

    let cache: Cache<String> = Cache::from_config(&config).context("creating string cache")?;

    cache.set("foo", "bar".to_string(), DEFAULT_EXPIRATION);

    // Stays until it is overwritten or deleted
    cache.set("baz", "lightning".to_string(), NO_EXPIRATION);

    if let Some(foo) = cache.get("foo") {
        println!("{foo}");
    }

    // Values are cloned on the way out, so store handles for large values
    let handles: Cache<Arc<DateTime<Utc>>> =
        Cache::from_config(&config).context("creating timestamp cache")?;
    handles.set("foo", Arc::new(Utc::now()), DEFAULT_EXPIRATION);
    if let Some(at) = handles.get("foo") {
        println!("Cached time {at}");
    }

    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    cache.stop_janitor();
    handles.stop_janitor();
    info!("Demo complete");

    Ok(())
}
