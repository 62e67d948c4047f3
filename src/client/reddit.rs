//! Reddit JSON API client for listings and subreddit search.
//!
//! Talks to the OAuth API host with a caller-supplied bearer token —
//! the token exchange itself happens outside this crate. Every call
//! reserves local rate budget first and feeds the `x-ratelimit-*`
//! response headers back into the shared [`RateLimiter`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::ListingSource;
use crate::limiter::RateLimiter;
use crate::retry::{RetryConfig, with_retry};
use crate::telemetry;
use crate::types::{ListingQuery, Post, SubredditInfo};
use crate::{MuninnError, Result};

/// Default base URL for the authenticated Reddit API
const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";

/// Thumbnail values Reddit uses as placeholders rather than URLs.
const THUMBNAIL_PLACEHOLDERS: &[&str] = &["self", "default", "nsfw", "spoiler", "image", ""];

/// Client for the Reddit JSON API.
///
/// Supports:
/// - Subreddit listings (`/r/{subreddit}/{sort}.json`)
/// - Subreddit search (`/subreddits/search.json`)
#[derive(Clone)]
pub struct RedditClient {
    access_token: String,
    user_agent: String,
    http: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
}

impl RedditClient {
    /// Create a new client with the given bearer token and user agent.
    pub fn new(
        access_token: impl Into<String>,
        user_agent: impl Into<String>,
        limiter: Arc<RateLimiter>,
        retry: RetryConfig,
    ) -> Self {
        Self::with_base_url(access_token, user_agent, limiter, retry, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        access_token: impl Into<String>,
        user_agent: impl Into<String>,
        limiter: Arc<RateLimiter>,
        retry: RetryConfig,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            access_token: access_token.into(),
            user_agent: user_agent.into(),
            http,
            base_url: base_url.into(),
            limiter,
            retry,
        }
    }

    async fn fetch_listing_once(&self, query: &ListingQuery) -> Result<Vec<Post>> {
        self.limiter.reserve().await?;

        let url = format!(
            "{}/r/{}/{}.json",
            self.base_url,
            query.subreddit(),
            query.sort()
        );
        let response = self
            .http
            .get(&url)
            .query(&[("limit", query.limit())])
            .query(&[("raw_json", 1)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        self.update_budget(&response);
        self.handle_response_errors(&response, query.subreddit())?;

        let envelope: ListingEnvelope = response
            .json()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let posts: Vec<Post> = envelope
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_post())
            .collect();
        debug!(
            subreddit = query.subreddit(),
            count = posts.len(),
            "fetched listing"
        );
        Ok(posts)
    }

    async fn search_subreddits_once(&self, search: &str, limit: usize) -> Result<Vec<SubredditInfo>> {
        self.limiter.reserve().await?;

        let url = format!("{}/subreddits/search.json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", search)])
            .query(&[("limit", limit)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        self.update_budget(&response);
        self.handle_response_errors(&response, search)?;

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        Ok(envelope
            .data
            .children
            .into_iter()
            .map(|child| SubredditInfo {
                name: child.data.display_name,
                title: child.data.title.filter(|t| !t.is_empty()),
                subscribers: child.data.subscribers,
            })
            .collect())
    }

    /// Mirror the reported budget into the shared limiter.
    ///
    /// Reddit sends `x-ratelimit-remaining` (fractional) and
    /// `x-ratelimit-reset` (seconds to window reset) on every response,
    /// including errors. Missing or malformed headers leave the local
    /// budget untouched.
    fn update_budget(&self, response: &reqwest::Response) {
        let remaining = header_value(response, "x-ratelimit-remaining")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|r| r.max(0.0) as u32);
        let reset = header_value(response, "x-ratelimit-reset")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        if let (Some(remaining), Some(reset)) = (remaining, reset) {
            self.limiter.update(remaining, reset);
        }
    }

    /// Check response status and map to the appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response, resource: &str) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 | 403 => Err(MuninnError::AuthenticationFailed),
            404 => Err(MuninnError::SubredditNotFound(resource.to_string())),
            429 => {
                let retry_after = header_value(response, "retry-after")
                    .or_else(|| header_value(response, "x-ratelimit-reset"))
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(MuninnError::RateLimited { retry_after })
            }
            code => Err(MuninnError::Upstream {
                status: code,
                message: format!("Reddit API error: {}", status),
            }),
        }
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[async_trait]
impl ListingSource for RedditClient {
    async fn fetch_listing(&self, query: &ListingQuery) -> Result<Vec<Post>> {
        let result = with_retry(&self.retry, "listing", || self.fetch_listing_once(query)).await;
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => "listing",
            "status" => if result.is_ok() { "ok" } else { "error" },
        )
        .increment(1);
        result
    }

    async fn search_subreddits(&self, query: &str, limit: usize) -> Result<Vec<SubredditInfo>> {
        let result = with_retry(&self.retry, "search", || {
            self.search_subreddits_once(query, limit)
        })
        .await;
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => "search",
            "status" => if result.is_ok() { "ok" } else { "error" },
        )
        .increment(1);
        result
    }
}

#[derive(Deserialize)]
struct ListingEnvelope {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing<RawPost>>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    data: SearchData,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(default)]
    children: Vec<Thing<RawSubreddit>>,
}

#[derive(Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Deserialize)]
struct RawPost {
    id: String,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    thumbnail: String,
    #[serde(default)]
    num_comments: u64,
}

impl RawPost {
    /// Normalize the raw wire shape into a [`Post`].
    ///
    /// Deleted accounts come through with a missing or empty author;
    /// thumbnail placeholder strings are dropped; selftext is kept only
    /// for self posts with content; the permalink path is expanded to a
    /// full URL.
    fn into_post(self) -> Post {
        let author = match self.author {
            Some(name) if !name.is_empty() => name,
            _ => "[deleted]".to_string(),
        };
        let thumbnail = if THUMBNAIL_PLACEHOLDERS.contains(&self.thumbnail.as_str()) {
            None
        } else {
            Some(self.thumbnail)
        };
        let selftext = if self.is_self && !self.selftext.is_empty() {
            Some(self.selftext)
        } else {
            None
        };
        Post {
            id: self.id,
            title: self.title,
            author,
            score: self.score,
            created_utc: self.created_utc,
            url: self.url,
            permalink: format!("https://www.reddit.com{}", self.permalink),
            is_self: self.is_self,
            selftext,
            thumbnail,
            num_comments: self.num_comments,
            tldr: None,
        }
    }
}

#[derive(Deserialize)]
struct RawSubreddit {
    display_name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subscribers: Option<u64>,
}
