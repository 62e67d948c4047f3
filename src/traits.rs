//! Core PostGateway trait

use async_trait::async_trait;

use crate::Result;
use crate::types::{Listing, SubredditInfo};

/// The operations muninn exposes to its callers (a routing or
/// presentation layer).
///
/// This trait is the stable seam: consumers interact with listings and
/// summaries without coupling to the orchestration pipeline behind it.
#[async_trait]
pub trait PostGateway: Send + Sync {
    /// Fetch up to `limit` posts for a subreddit.
    ///
    /// `limit` must be within 1–25. `force_refresh` bypasses the
    /// listing cache (the fetch is still coalesced with identical
    /// in-flight requests). With `with_summaries`, each post gets a
    /// best-effort summary — enrichment failures leave the affected
    /// post unsummarized and never fail the listing.
    async fn get_posts(
        &self,
        subreddit: &str,
        limit: usize,
        force_refresh: bool,
        with_summaries: bool,
    ) -> Result<Listing>;

    /// Search for subreddits matching a free-text query. Same count
    /// bound as `get_posts`.
    async fn search_subreddits(&self, query: &str, limit: usize) -> Result<Vec<SubredditInfo>>;

    /// Generate (or return the cached) summary for one post,
    /// idempotent per post id.
    async fn summarize_post(&self, post_id: &str, title: &str, body: &str) -> Result<String>;
}
