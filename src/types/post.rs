//! Post and listing response types.

use serde::{Deserialize, Serialize};

/// One content record fetched from upstream.
///
/// Immutable once fetched, except that enrichment may attach a summary
/// by producing a new copy via [`with_summary`](Post::with_summary) —
/// concurrent readers never observe a half-written post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Upstream post id (e.g. `"1abcde"`).
    pub id: String,
    pub title: String,
    /// Author username, `"[deleted]"` when the account is gone.
    pub author: String,
    /// Upvote score.
    pub score: i64,
    /// Creation time, seconds since the Unix epoch.
    pub created_utc: f64,
    /// Link target (external URL, or the post itself for self posts).
    pub url: String,
    /// Full permalink on the upstream site.
    pub permalink: String,
    /// Whether this is a text (self) post.
    pub is_self: bool,
    /// Body text, present only for self posts with content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selftext: Option<String>,
    /// Thumbnail URL when one exists (placeholder values are dropped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub num_comments: u64,
    /// AI-generated summary, attached by the enrichment service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tldr: Option<String>,
}

impl Post {
    /// Copy of this post with a summary attached.
    pub fn with_summary(&self, summary: impl Into<String>) -> Post {
        Post {
            tldr: Some(summary.into()),
            ..self.clone()
        }
    }

    /// Text the summarizer should work from: the body for self posts,
    /// the title otherwise.
    pub fn summary_source(&self) -> &str {
        match self.selftext.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => &self.title,
        }
    }
}

/// One resolved listing request: the posts plus response metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// Normalized subreddit name.
    pub subreddit: String,
    pub posts: Vec<Post>,
    /// When the underlying fetch happened, seconds since the Unix epoch.
    /// A cache hit keeps the original fetch time.
    pub fetched_at: u64,
    /// Whether enrichment ran over this listing (individual posts may
    /// still lack a summary if their enrichment failed).
    pub summarized: bool,
}

/// A subreddit descriptor returned by the search operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditInfo {
    /// Display name (e.g. `"rust"`).
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            id: "abc123".into(),
            title: "A title".into(),
            author: "someone".into(),
            score: 42,
            created_utc: 1_700_000_000.0,
            url: "https://example.com".into(),
            permalink: "https://www.reddit.com/r/rust/comments/abc123/a_title/".into(),
            is_self: true,
            selftext: Some("body text".into()),
            thumbnail: None,
            num_comments: 7,
            tldr: None,
        }
    }

    #[test]
    fn with_summary_leaves_original_untouched() {
        let original = post();
        let enriched = original.with_summary("short version");
        assert!(original.tldr.is_none());
        assert_eq!(enriched.tldr.as_deref(), Some("short version"));
        assert_eq!(enriched.id, original.id);
    }

    #[test]
    fn summary_source_prefers_body() {
        assert_eq!(post().summary_source(), "body text");
    }

    #[test]
    fn summary_source_falls_back_to_title() {
        let mut p = post();
        p.selftext = Some("   ".into());
        assert_eq!(p.summary_source(), "A title");
        p.selftext = None;
        assert_eq!(p.summary_source(), "A title");
    }
}
