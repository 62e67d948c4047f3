//! Listing cache with single-flight fetch coalescing.
//!
//! Two pieces of state:
//!
//! - a moka TTL cache holding the last successful [`ListingEntry`] per
//!   normalized query — expiry is lazy (checked on read), entries are
//!   replaced wholesale on refresh and never mutated in place;
//! - an in-flight registry of shared pending fetches, keyed the same
//!   way. The first caller for a key installs the fetch; every later
//!   caller (including `force_refresh` callers) attaches to it instead
//!   of issuing a duplicate upstream call. The slot is cleared by the
//!   fetch itself on completion, success or failure, independent of the
//!   value cache.
//!
//! A detached driver task polls each fetch to completion, so a caller
//! that stops waiting never cancels the fetch for the other waiters or
//! for the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use moka::future::Cache;
use tracing::debug;

use crate::Result;
use crate::client::ListingSource;
use crate::telemetry;
use crate::types::{ListingQuery, Post};

/// Configuration for the listing cache.
///
/// ```rust
/// # use muninn::ListingCacheConfig;
/// # use std::time::Duration;
/// let config = ListingCacheConfig::new()
///     .ttl(Duration::from_secs(30))
///     .max_entries(128);
/// ```
#[derive(Debug, Clone)]
pub struct ListingCacheConfig {
    /// Time-to-live for cached listings. Default: 60s.
    pub ttl: Duration,
    /// Maximum number of cached listings. Default: 256.
    pub max_entries: u64,
}

impl Default for ListingCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 256,
        }
    }
}

impl ListingCacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live for cached listings.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of cached listings.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

/// A cached result set: the fetched posts plus fetch-time metadata.
///
/// Owned by the cache, shared out behind an `Arc`, replaced wholesale
/// on refresh.
#[derive(Debug)]
pub struct ListingEntry {
    pub posts: Vec<Post>,
    fetched_at: SystemTime,
    fetched_instant: Instant,
}

impl ListingEntry {
    fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            fetched_at: SystemTime::now(),
            fetched_instant: Instant::now(),
        }
    }

    /// Wall-clock fetch time.
    pub fn fetched_at(&self) -> SystemTime {
        self.fetched_at
    }

    /// Fetch time as seconds since the Unix epoch.
    pub fn fetched_at_unix(&self) -> u64 {
        self.fetched_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// How long ago this entry was fetched.
    pub fn age(&self) -> Duration {
        self.fetched_instant.elapsed()
    }
}

type ListingFuture = Shared<BoxFuture<'static, Result<Arc<ListingEntry>>>>;

/// Keyed listing store with TTL expiry and request coalescing.
pub struct ListingCache {
    entries: Cache<String, Arc<ListingEntry>>,
    inflight: Arc<Mutex<HashMap<String, ListingFuture>>>,
    source: Arc<dyn ListingSource>,
}

impl ListingCache {
    /// Create a cache in front of the given listing source.
    pub fn new(source: Arc<dyn ListingSource>, config: &ListingCacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            entries,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            source,
        }
    }

    /// Return a fresh cached entry, or fetch one.
    ///
    /// With `force_refresh` the freshness check is skipped and a new
    /// fetch is triggered — though still coalesced with any fetch for
    /// the same key already in flight. Fetch failures propagate to every
    /// waiter; an expired prior entry is not resurrected.
    pub async fn get_or_fetch(
        &self,
        query: &ListingQuery,
        force_refresh: bool,
    ) -> Result<Arc<ListingEntry>> {
        let key = query.cache_key();
        if !force_refresh {
            if let Some(entry) = self.entries.get(&key).await {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(key = %key, age_ms = entry.age().as_millis() as u64, "listing cache hit");
                return Ok(entry);
            }
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        }
        self.join_or_start(key, query).await
    }

    /// Drop any cached entry for the query.
    pub async fn invalidate(&self, query: &ListingQuery) {
        self.entries.invalidate(&query.cache_key()).await;
    }

    /// Attach to an in-flight fetch for `key`, or start one.
    ///
    /// The registry lock covers only the decision of "start a new fetch"
    /// vs. "attach to an existing one" — never the fetch itself.
    async fn join_or_start(&self, key: String, query: &ListingQuery) -> Result<Arc<ListingEntry>> {
        let fut = {
            let mut inflight = self
                .inflight
                .lock()
                .expect("in-flight registry lock poisoned");
            if let Some(existing) = inflight.get(&key) {
                metrics::counter!(telemetry::COALESCED_FETCHES_TOTAL).increment(1);
                debug!(key = %key, "attaching to in-flight fetch");
                existing.clone()
            } else {
                let fut = self.start_fetch(key.clone(), query.clone());
                inflight.insert(key, fut.clone());
                // Detached driver: the fetch runs to completion and
                // populates the cache even if every waiter is cancelled.
                tokio::spawn(fut.clone().map(|_| ()));
                fut
            }
        };
        fut.await
    }

    fn start_fetch(&self, key: String, query: ListingQuery) -> ListingFuture {
        let source = Arc::clone(&self.source);
        let entries = self.entries.clone();
        let registry = Arc::clone(&self.inflight);
        async move {
            let result = match source.fetch_listing(&query).await {
                Ok(posts) => {
                    let entry = Arc::new(ListingEntry::new(posts));
                    entries.insert(key.clone(), Arc::clone(&entry)).await;
                    Ok(entry)
                }
                Err(e) => Err(e),
            };
            // Clear the slot before any waiter resumes; the registry
            // holds pending computations only.
            registry
                .lock()
                .expect("in-flight registry lock poisoned")
                .remove(&key);
            result
        }
        .boxed()
        .shared()
    }
}
