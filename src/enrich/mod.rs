//! Best-effort per-post enrichment.
//!
//! [`EnrichmentService`] attaches AI-generated summaries to posts. Its
//! one hard rule: enrichment never breaks the listing. A summarization
//! failure — timeout, upstream error, malformed reply — is logged,
//! counted, and the post comes back unchanged.
//!
//! Summaries are cached per post id with their own lifecycle: a listing
//! can expire and be refetched while the summaries for posts that still
//! exist stay valid and are re-attached by id lookup. The cache loads
//! through moka's `try_get_with`, so concurrent requests for the same
//! id coalesce into one summarization call.

mod openai;

pub use openai::OpenAiSummarizer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use moka::future::Cache;
use tracing::warn;

use crate::telemetry;
use crate::types::Post;
use crate::{MuninnError, Result};

/// A summarization backend.
///
/// Given a post's title and body text, returns a short summary or
/// fails. Implementations should not retry internally — callers treat
/// enrichment as best-effort.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, body: &str) -> Result<String>;
}

/// Configuration for the enrichment service.
///
/// ```rust
/// # use muninn::EnrichmentConfig;
/// # use std::time::Duration;
/// let config = EnrichmentConfig::new()
///     .max_concurrency(8)
///     .batch_deadline(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Concurrent summarization calls per batch. Default: 4.
    pub max_concurrency: usize,
    /// Deadline for a single summarization call. Default: 10s.
    pub per_item_timeout: Duration,
    /// Deadline for a whole `enrich_all` batch; posts still pending
    /// when it elapses are returned unenriched. Default: 30s.
    pub batch_deadline: Duration,
    /// Time-to-live for cached summaries. Default: 1 hour.
    pub cache_ttl: Duration,
    /// Maximum number of cached summaries. Default: 10,000.
    pub max_entries: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            per_item_timeout: Duration::from_secs(10),
            batch_deadline: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            max_entries: 10_000,
        }
    }
}

impl EnrichmentConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrent call bound for batches.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Set the per-call deadline.
    pub fn per_item_timeout(mut self, timeout: Duration) -> Self {
        self.per_item_timeout = timeout;
        self
    }

    /// Set the whole-batch deadline.
    pub fn batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = deadline;
        self
    }

    /// Set the time-to-live for cached summaries.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the maximum number of cached summaries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

/// Attaches summaries to posts, isolating failures per post.
pub struct EnrichmentService {
    summarizer: Arc<dyn Summarizer>,
    summaries: Cache<String, String>,
    config: EnrichmentConfig,
}

impl EnrichmentService {
    /// Create a service over the given summarization backend.
    pub fn new(summarizer: Arc<dyn Summarizer>, config: EnrichmentConfig) -> Self {
        let summaries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.cache_ttl)
            .build();
        Self {
            summarizer,
            summaries,
            config,
        }
    }

    /// Summary for one post, idempotent per id.
    ///
    /// A cached summary is returned without any upstream call;
    /// otherwise the backend is called under the per-item deadline and
    /// the result cached. Concurrent calls for the same id share one
    /// backend call. Errors are not cached — a later request may retry.
    pub async fn summary(&self, id: &str, title: &str, body: &str) -> Result<String> {
        if let Some(cached) = self.summaries.get(id).await {
            metrics::counter!(telemetry::SUMMARY_CACHE_HITS_TOTAL).increment(1);
            return Ok(cached);
        }

        let summarizer = Arc::clone(&self.summarizer);
        let title = title.to_owned();
        let body = body.to_owned();
        let per_item = self.config.per_item_timeout;
        self.summaries
            .try_get_with(id.to_owned(), async move {
                match tokio::time::timeout(per_item, summarizer.summarize(&title, &body)).await {
                    Ok(result) => result,
                    Err(_) => Err(MuninnError::Summarization(format!(
                        "timed out after {}ms",
                        per_item.as_millis()
                    ))),
                }
            })
            .await
            .map_err(|e: Arc<MuninnError>| (*e).clone())
    }

    /// Enrich one post, returning it unchanged on failure.
    pub async fn enrich(&self, post: &Post) -> Post {
        match self
            .summary(&post.id, &post.title, post.summary_source())
            .await
        {
            Ok(summary) => post.with_summary(summary),
            Err(e) => {
                metrics::counter!(telemetry::SUMMARY_FAILURES_TOTAL).increment(1);
                warn!(post_id = %post.id, error = %e, "enrichment failed, returning post unenriched");
                post.clone()
            }
        }
    }

    /// Enrich one post under the batch deadline, returning it unchanged
    /// if the deadline elapses first.
    async fn enrich_before(&self, post: &Post, deadline: tokio::time::Instant) -> Post {
        match tokio::time::timeout_at(deadline, self.enrich(post)).await {
            Ok(enriched) => enriched,
            Err(_) => {
                metrics::counter!(telemetry::SUMMARY_FAILURES_TOTAL).increment(1);
                warn!(post_id = %post.id, "batch deadline elapsed, returning post unenriched");
                post.clone()
            }
        }
    }

    /// Enrich a batch, bounded in concurrency and wall-clock time.
    ///
    /// Output length and order always match the input, regardless of
    /// completion order of the underlying calls. Posts whose
    /// enrichment has not finished when the batch deadline elapses are
    /// returned unenriched — not dropped, not retried within this call.
    pub async fn enrich_all(&self, posts: &[Post]) -> Vec<Post> {
        if posts.is_empty() {
            return Vec::new();
        }
        let deadline = tokio::time::Instant::now() + self.config.batch_deadline;
        let futures: Vec<_> = posts
            .iter()
            .map(|post| self.enrich_before(post, deadline))
            .collect();
        stream::iter(futures)
            .buffered(self.config.max_concurrency)
            .collect()
            .await
    }
}
