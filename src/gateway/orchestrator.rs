//! FetchOrchestrator — the façade tying cache, client, and enrichment
//! together for one logical request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::cache::ListingCache;
use crate::client::ListingSource;
use crate::enrich::EnrichmentService;
use crate::traits::PostGateway;
use crate::types::{Listing, ListingQuery, SortOrder, SubredditInfo};
use crate::{MuninnError, Result};

/// Smallest accepted item limit.
pub const MIN_LIMIT: usize = 1;
/// Largest accepted item limit.
pub const MAX_LIMIT: usize = 25;

/// Gateway over the fetch–cache–enrich pipeline.
///
/// Listing failures are fatal to the whole request — there is no
/// partial listing. Enrichment failures are isolated per post and never
/// escalate. Built via [`Muninn::builder()`](crate::Muninn::builder).
pub struct FetchOrchestrator {
    cache: ListingCache,
    source: Arc<dyn ListingSource>,
    enrichment: Option<EnrichmentService>,
    sort: SortOrder,
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("enrichment", &self.enrichment.is_some())
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

impl FetchOrchestrator {
    pub(crate) fn new(
        cache: ListingCache,
        source: Arc<dyn ListingSource>,
        enrichment: Option<EnrichmentService>,
        sort: SortOrder,
    ) -> Self {
        Self {
            cache,
            source,
            enrichment,
            sort,
        }
    }

    /// Drop any cached listing for a subreddit at the configured sort.
    pub async fn invalidate(&self, subreddit: &str, limit: usize) {
        let query = ListingQuery::new(subreddit, limit, self.sort);
        self.cache.invalidate(&query).await;
    }
}

fn validate_limit(limit: usize) -> Result<()> {
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(MuninnError::InvalidInput(format!(
            "limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

fn validate_nonempty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MuninnError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

#[async_trait]
impl PostGateway for FetchOrchestrator {
    async fn get_posts(
        &self,
        subreddit: &str,
        limit: usize,
        force_refresh: bool,
        with_summaries: bool,
    ) -> Result<Listing> {
        validate_limit(limit)?;
        validate_nonempty(subreddit, "subreddit")?;
        if with_summaries && self.enrichment.is_none() {
            return Err(MuninnError::NoSummarizer);
        }

        let query = ListingQuery::new(subreddit, limit, self.sort);
        let entry = self.cache.get_or_fetch(&query, force_refresh).await?;

        let (posts, summarized) = match (with_summaries, &self.enrichment) {
            (true, Some(enrichment)) => {
                info!(
                    subreddit = query.subreddit(),
                    count = entry.posts.len(),
                    "enriching listing"
                );
                (enrichment.enrich_all(&entry.posts).await, true)
            }
            _ => (entry.posts.clone(), false),
        };

        Ok(Listing {
            subreddit: query.subreddit().to_string(),
            posts,
            fetched_at: entry.fetched_at_unix(),
            summarized,
        })
    }

    async fn search_subreddits(&self, query: &str, limit: usize) -> Result<Vec<SubredditInfo>> {
        validate_limit(limit)?;
        validate_nonempty(query, "search query")?;
        self.source.search_subreddits(query.trim(), limit).await
    }

    async fn summarize_post(&self, post_id: &str, title: &str, body: &str) -> Result<String> {
        validate_nonempty(post_id, "post id")?;
        match &self.enrichment {
            Some(enrichment) => enrichment.summary(post_id, title, body).await,
            None => Err(MuninnError::NoSummarizer),
        }
    }
}
