//! Builder for configuring gateway instances

use std::sync::Arc;

use super::FetchOrchestrator;
use crate::cache::{ListingCache, ListingCacheConfig};
use crate::client::{ListingSource, RedditClient};
use crate::enrich::{EnrichmentConfig, EnrichmentService, OpenAiSummarizer, Summarizer};
use crate::limiter::{RateLimiter, RateLimiterConfig};
use crate::retry::RetryConfig;
use crate::types::SortOrder;
use crate::{MuninnError, Result};

/// Main entry point for creating gateway instances.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct MuninnBuilder {
    reddit_token: Option<String>,
    user_agent: Option<String>,
    reddit_base_url: Option<String>,
    openai_key: Option<String>,
    openai_base_url: Option<String>,
    summary_model: Option<String>,
    sort: SortOrder,
    cache_config: ListingCacheConfig,
    retry: RetryConfig,
    limiter_config: RateLimiterConfig,
    enrichment_config: EnrichmentConfig,
    listing_source: Option<Arc<dyn ListingSource>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            reddit_token: None,
            user_agent: None,
            reddit_base_url: None,
            openai_key: None,
            openai_base_url: None,
            summary_model: None,
            sort: SortOrder::default(),
            cache_config: ListingCacheConfig::default(),
            retry: RetryConfig::default(),
            limiter_config: RateLimiterConfig::default(),
            enrichment_config: EnrichmentConfig::default(),
            listing_source: None,
            summarizer: None,
        }
    }

    /// Set the Reddit API bearer token.
    ///
    /// The OAuth token exchange happens outside this crate; muninn only
    /// needs the resulting token.
    pub fn reddit_token(mut self, token: impl Into<String>) -> Self {
        self.reddit_token = Some(token.into());
        self
    }

    /// Set the user agent reported to Reddit. Defaults to
    /// `muninn/<version>`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Override the Reddit API base URL (for testing).
    pub fn reddit_base_url(mut self, url: impl Into<String>) -> Self {
        self.reddit_base_url = Some(url.into());
        self
    }

    /// Configure OpenAI-backed summarization.
    pub fn openai(mut self, api_key: impl Into<String>) -> Self {
        self.openai_key = Some(api_key.into());
        self
    }

    /// Override the OpenAI API base URL (for testing).
    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = Some(url.into());
        self
    }

    /// Override the summarization model.
    pub fn summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = Some(model.into());
        self
    }

    /// Set the listing sort order. Defaults to newest-first.
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Configure the listing cache.
    pub fn listing_cache(mut self, config: ListingCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Configure retry behaviour for upstream calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Configure the local rate budget.
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.limiter_config = config;
        self
    }

    /// Configure enrichment fan-out and caching.
    pub fn enrichment(mut self, config: EnrichmentConfig) -> Self {
        self.enrichment_config = config;
        self
    }

    /// Use a custom listing source instead of the Reddit client.
    ///
    /// Intended for tests and embedding; the source is then responsible
    /// for its own rate limiting and retries.
    pub fn listing_source(mut self, source: Arc<dyn ListingSource>) -> Self {
        self.listing_source = Some(source);
        self
    }

    /// Use a custom summarization backend instead of OpenAI.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Build the gateway.
    ///
    /// Fails with [`MuninnError::Configuration`] when neither a Reddit
    /// token nor a custom listing source was provided.
    pub fn build(self) -> Result<FetchOrchestrator> {
        let source: Arc<dyn ListingSource> = match self.listing_source {
            Some(source) => source,
            None => {
                let token = self.reddit_token.ok_or_else(|| {
                    MuninnError::Configuration(
                        "a Reddit access token (or a custom listing source) is required".into(),
                    )
                })?;
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("muninn/{}", env!("CARGO_PKG_VERSION")));
                let limiter = Arc::new(RateLimiter::new(self.limiter_config));
                let client = match self.reddit_base_url {
                    Some(base) => RedditClient::with_base_url(
                        token,
                        user_agent,
                        limiter,
                        self.retry.clone(),
                        base,
                    ),
                    None => RedditClient::new(token, user_agent, limiter, self.retry.clone()),
                };
                Arc::new(client)
            }
        };

        let summarizer: Option<Arc<dyn Summarizer>> = match self.summarizer {
            Some(summarizer) => Some(summarizer),
            None => self.openai_key.map(|key| {
                let summarizer = match self.openai_base_url {
                    Some(base) => OpenAiSummarizer::with_base_url(key, base),
                    None => OpenAiSummarizer::new(key),
                };
                let summarizer = match self.summary_model {
                    Some(model) => summarizer.model(model),
                    None => summarizer,
                };
                Arc::new(summarizer) as Arc<dyn Summarizer>
            }),
        };
        let enrichment =
            summarizer.map(|s| EnrichmentService::new(s, self.enrichment_config.clone()));

        let cache = ListingCache::new(Arc::clone(&source), &self.cache_config);
        Ok(FetchOrchestrator::new(cache, source, enrichment, self.sort))
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
