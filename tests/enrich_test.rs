//! Tests for [`EnrichmentService`] — per-post isolation, ordering, and
//! the summary cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use muninn::{EnrichmentConfig, EnrichmentService, MuninnError, Post, Result, Summarizer};

/// Mock backend: fails for titles containing "fail", tracks call count
/// and peak concurrency.
struct MockSummarizer {
    calls: AtomicU32,
    concurrent: AtomicU32,
    peak: AtomicU32,
    delay: Duration,
}

impl MockSummarizer {
    fn new() -> Self {
        Self::slow(Duration::ZERO)
    }

    fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            concurrent: AtomicU32::new(0),
            peak: AtomicU32::new(0),
            delay,
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, title: &str, _body: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        if title.contains("fail") {
            return Err(MuninnError::Summarization("backend refused".into()));
        }
        Ok(format!("summary of {title}"))
    }
}

fn make_post(id: &str, title: &str) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        author: "someone".into(),
        score: 10,
        created_utc: 1_700_000_000.0,
        url: "https://example.com".into(),
        permalink: format!("https://www.reddit.com/r/rust/comments/{id}/"),
        is_self: true,
        selftext: Some(format!("body of {id}")),
        thumbnail: None,
        num_comments: 2,
        tldr: None,
    }
}

fn service(summarizer: &Arc<MockSummarizer>, config: EnrichmentConfig) -> EnrichmentService {
    EnrichmentService::new(Arc::clone(summarizer) as Arc<dyn Summarizer>, config)
}

#[tokio::test]
async fn enrich_attaches_summary() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let post = make_post("p1", "A question");
    let enriched = service.enrich(&post).await;

    assert_eq!(enriched.tldr.as_deref(), Some("summary of A question"));
    assert!(post.tldr.is_none(), "input post is never mutated");
}

#[tokio::test]
async fn enrich_failure_returns_post_unchanged() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let post = make_post("p1", "this will fail");
    let result = service.enrich(&post).await;

    assert_eq!(result, post);
    assert_eq!(summarizer.call_count(), 1);
}

#[tokio::test]
async fn enrich_all_preserves_length_and_order_with_mixed_failures() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let posts: Vec<Post> = vec![
        make_post("p1", "first"),
        make_post("p2", "second"),
        make_post("p3", "third will fail"),
        make_post("p4", "fourth"),
        make_post("p5", "fifth"),
    ];

    let enriched = service.enrich_all(&posts).await;

    assert_eq!(enriched.len(), 5);
    let ids: Vec<&str> = enriched.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p2", "p3", "p4", "p5"]);
    for (i, post) in enriched.iter().enumerate() {
        if i == 2 {
            assert!(post.tldr.is_none(), "failed post comes back unenriched");
        } else {
            assert!(post.tldr.is_some(), "post #{i} should carry a summary");
        }
    }
}

#[tokio::test]
async fn second_enrich_hits_the_summary_cache() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let post = make_post("p1", "A question");
    let first = service.enrich(&post).await;
    let second = service.enrich(&post).await;

    assert_eq!(summarizer.call_count(), 1, "cached summary, no second call");
    assert_eq!(first.tldr, second.tldr);
}

#[tokio::test]
async fn summary_is_idempotent_per_id() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let a = service.summary("p1", "A question", "body").await.expect("first");
    let b = service.summary("p1", "A question", "body").await.expect("second");

    assert_eq!(a, b);
    assert_eq!(summarizer.call_count(), 1);
}

#[tokio::test]
async fn summary_failure_surfaces_and_is_not_cached() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());

    let err = service
        .summary("p1", "fail on purpose", "body")
        .await
        .expect_err("backend refused");
    assert!(matches!(err, MuninnError::Summarization(_)));

    // A failure is retryable: the next request calls the backend again.
    service
        .summary("p1", "fail on purpose", "body")
        .await
        .expect_err("still refused");
    assert_eq!(summarizer.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn per_item_timeout_is_swallowed() {
    let summarizer = Arc::new(MockSummarizer::slow(Duration::from_secs(60)));
    let config = EnrichmentConfig::new().per_item_timeout(Duration::from_secs(1));
    let service = service(&summarizer, config);

    let post = make_post("p1", "slow one");
    let result = service.enrich(&post).await;

    assert!(result.tldr.is_none());
}

#[tokio::test(start_paused = true)]
async fn batch_deadline_returns_pending_posts_unenriched() {
    let summarizer = Arc::new(MockSummarizer::slow(Duration::from_secs(60)));
    let config = EnrichmentConfig::new()
        .per_item_timeout(Duration::from_secs(120))
        .batch_deadline(Duration::from_secs(1));
    let service = service(&summarizer, config);

    let posts: Vec<Post> = (0..6)
        .map(|i| make_post(&format!("p{i}"), &format!("title {i}")))
        .collect();
    let enriched = service.enrich_all(&posts).await;

    assert_eq!(enriched.len(), 6, "deadline never drops posts");
    let ids: Vec<&str> = enriched.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p0", "p1", "p2", "p3", "p4", "p5"]);
    assert!(enriched.iter().all(|p| p.tldr.is_none()));
}

#[tokio::test(start_paused = true)]
async fn fan_out_respects_concurrency_bound() {
    let summarizer = Arc::new(MockSummarizer::slow(Duration::from_millis(100)));
    let config = EnrichmentConfig::new().max_concurrency(2);
    let service = service(&summarizer, config);

    let posts: Vec<Post> = (0..8)
        .map(|i| make_post(&format!("p{i}"), &format!("title {i}")))
        .collect();
    let enriched = service.enrich_all(&posts).await;

    assert_eq!(enriched.len(), 8);
    assert!(enriched.iter().all(|p| p.tldr.is_some()));
    assert!(
        summarizer.peak.load(Ordering::SeqCst) <= 2,
        "no more than two calls in flight"
    );
}

#[tokio::test]
async fn empty_batch_yields_empty_output() {
    let summarizer = Arc::new(MockSummarizer::new());
    let service = service(&summarizer, EnrichmentConfig::default());
    assert!(service.enrich_all(&[]).await.is_empty());
}
