//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `operation` — gateway operation (e.g. "listing", "search", "summarize")
//! - `status` — outcome: "ok" or "error"

/// Total upstream requests dispatched.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "muninn_requests_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "muninn_retries_total";

/// Total listing cache hits.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total listing cache misses.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total fetches coalesced onto an already in-flight call.
pub const COALESCED_FETCHES_TOTAL: &str = "muninn_coalesced_fetches_total";

/// Total times a caller slept waiting for the rate budget to reset.
pub const RATE_LIMIT_WAITS_TOTAL: &str = "muninn_rate_limit_waits_total";

/// Total per-post summarization failures (swallowed at the item level).
pub const SUMMARY_FAILURES_TOTAL: &str = "muninn_summary_failures_total";

/// Total summary cache hits.
pub const SUMMARY_CACHE_HITS_TOTAL: &str = "muninn_summary_cache_hits_total";
