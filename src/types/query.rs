//! Listing query — the normalized cache key.

use std::fmt;

/// Listing sort order.
///
/// Maps directly to the upstream listing endpoint path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Newest posts first (the default, matching the upstream `new` feed).
    #[default]
    New,
    Hot,
    Top,
}

impl SortOrder {
    /// Upstream path segment for this sort.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::New => "new",
            SortOrder::Hot => "hot",
            SortOrder::Top => "top",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one listing request: subreddit, item limit, sort.
///
/// Immutable once built. The subreddit name is lower-cased on
/// construction so `"Rust"` and `"rust"` share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingQuery {
    subreddit: String,
    limit: usize,
    sort: SortOrder,
}

impl ListingQuery {
    /// Build a normalized query.
    pub fn new(subreddit: impl AsRef<str>, limit: usize, sort: SortOrder) -> Self {
        Self {
            subreddit: subreddit.as_ref().trim().to_lowercase(),
            limit,
            sort,
        }
    }

    /// Normalized subreddit name.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Requested item count.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Requested sort order.
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Canonical cache key: `{subreddit}/{sort}/{limit}`.
    ///
    /// Parameter order is fixed, so equal queries always produce equal
    /// keys regardless of how the caller phrased them.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.subreddit, self.sort, self.limit)
    }
}
