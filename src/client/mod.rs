//! Upstream listing client.
//!
//! [`ListingSource`] is the seam between the cache/orchestrator and the
//! network: production code uses [`RedditClient`], tests substitute
//! counting mocks.

mod reddit;

pub use reddit::RedditClient;

use async_trait::async_trait;

use crate::Result;
use crate::types::{ListingQuery, Post, SubredditInfo};

/// Upstream listing and search operations.
///
/// Implementations are expected to handle their own rate limiting and
/// retries; callers treat a returned error as final.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch an ordered sequence of posts for the given query.
    async fn fetch_listing(&self, query: &ListingQuery) -> Result<Vec<Post>>;

    /// Search for subreddits matching a free-text query.
    async fn search_subreddits(&self, query: &str, limit: usize) -> Result<Vec<SubredditInfo>>;
}
