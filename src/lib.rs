//! Muninn - caching fetch gateway for subreddit listings
//!
//! Muninn sits between a caller (typically a thin HTTP routing layer)
//! and the Reddit API. It caches listings to shield the upstream from
//! repeated or bursty requests, coalesces concurrent identical fetches
//! into a single upstream call, paces every outbound call against the
//! rate budget Reddit reports, and can attach a best-effort AI summary
//! to each post without letting a slow or failing summarization call
//! break the listing response.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{Muninn, PostGateway};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let gateway = Muninn::builder()
//!         .reddit_token("bearer-token")
//!         .openai("sk-your-key")
//!         .build()?;
//!
//!     let listing = gateway.get_posts("rust", 5, false, true).await?;
//!     for post in &listing.posts {
//!         println!("{} ({} points)", post.title, post.score);
//!         if let Some(tldr) = &post.tldr {
//!             println!("  TL;DR: {tldr}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The cache is process-lifetime and in-memory: a latency and
//! rate-limit shield, not a system of record.

pub mod cache;
pub mod client;
pub mod enrich;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod retry;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use error::{MuninnError, Result};
pub use gateway::{FetchOrchestrator, MAX_LIMIT, MIN_LIMIT, Muninn, MuninnBuilder};
pub use traits::PostGateway;

pub use cache::{ListingCache, ListingCacheConfig, ListingEntry};
pub use client::{ListingSource, RedditClient};
pub use enrich::{EnrichmentConfig, EnrichmentService, OpenAiSummarizer, Summarizer};
pub use limiter::{RateLimiter, RateLimiterConfig};
pub use retry::RetryConfig;
pub use types::{Listing, ListingQuery, Post, SortOrder, SubredditInfo};
