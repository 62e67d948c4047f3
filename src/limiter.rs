//! Upstream rate budget tracking.
//!
//! The upstream API reports a remaining-call count and a reset time on
//! every response. [`RateLimiter`] mirrors that budget locally and gates
//! outbound calls on it: [`reserve`](RateLimiter::reserve) grants while
//! budget remains, sleeps until the reset when it is exhausted, and
//! fails fast with [`MuninnError::RateLimited`] when the wait would
//! exceed the configured maximum.
//!
//! The budget is an explicitly owned, lock-guarded structure injected
//! into the client — not an ambient singleton — so tests can drive it
//! directly. The lock is only ever held across the grant/deny decision,
//! never across a sleep. Uses `tokio::time::Instant` throughout, so the
//! whole thing runs under paused time in tests.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::{MuninnError, Result};

/// Configuration for the local rate budget.
///
/// ```rust
/// # use muninn::RateLimiterConfig;
/// # use std::time::Duration;
/// let config = RateLimiterConfig::new()
///     .budget(50)
///     .window(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Calls allowed per window before the first upstream report
    /// arrives, and the refill amount after a reset. Default: 60.
    pub budget: u32,
    /// Window length used when refilling after a reset. Default: 60s.
    pub window: Duration,
    /// Longest a `reserve` call may sleep waiting for the reset before
    /// failing with `RateLimited`. Bounds request latency. Default: 30s.
    pub max_wait: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            budget: 60,
            window: Duration::from_secs(60),
            max_wait: Duration::from_secs(30),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the optimistic per-window call budget.
    pub fn budget(mut self, calls: u32) -> Self {
        self.budget = calls;
        self
    }

    /// Set the refill window length.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the maximum time `reserve` may block.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Remaining-call budget as last reported by (or inferred from) upstream.
#[derive(Debug)]
struct RateBudget {
    remaining: u32,
    reset_at: Instant,
}

/// Process-wide gate on outbound upstream calls.
///
/// Shared by every component that talks to the upstream API. Concurrent
/// callers serialize their budget checks on the internal lock, but the
/// network calls themselves run unserialized once budget is granted.
pub struct RateLimiter {
    budget: Mutex<RateBudget>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Create a limiter with a full optimistic budget.
    pub fn new(config: RateLimiterConfig) -> Self {
        let budget = RateBudget {
            remaining: config.budget,
            reset_at: Instant::now() + config.window,
        };
        Self {
            budget: Mutex::new(budget),
            config,
        }
    }

    /// Reserve one call's worth of budget.
    ///
    /// Grants immediately while budget remains. When the budget is
    /// exhausted, sleeps until the reported reset time and then refills
    /// the full configured budget. Fails with
    /// [`MuninnError::RateLimited`], carrying the required wait as a
    /// retry-after hint, when the sleep would exceed `max_wait`.
    ///
    /// The remaining count never goes negative: a call is delayed or
    /// refused rather than exceeding the last known budget.
    pub async fn reserve(&self) -> Result<()> {
        loop {
            let sleep_until = {
                let mut budget = self.budget.lock().expect("rate budget lock poisoned");
                let now = Instant::now();
                if now >= budget.reset_at {
                    // Window rolled over: full refill, minus this call.
                    budget.remaining = self.config.budget.saturating_sub(1);
                    budget.reset_at = now + self.config.window;
                    return Ok(());
                }
                if budget.remaining > 0 {
                    budget.remaining -= 1;
                    return Ok(());
                }
                let wait = budget.reset_at - now;
                if wait > self.config.max_wait {
                    return Err(MuninnError::RateLimited {
                        retry_after: Some(wait),
                    });
                }
                budget.reset_at
            };

            metrics::counter!(telemetry::RATE_LIMIT_WAITS_TOTAL).increment(1);
            debug!(
                wait_ms = (sleep_until - Instant::now()).as_millis() as u64,
                "rate budget exhausted, waiting for reset"
            );
            tokio::time::sleep_until(sleep_until).await;
            // Re-check under the lock: another waiter may have drained
            // the refilled budget while this task was waking up.
        }
    }

    /// Feed budget state back from upstream response metadata.
    ///
    /// Called after every upstream response with the reported remaining
    /// count and the time until the window resets.
    pub fn update(&self, remaining: u32, reset_after: Duration) {
        let mut budget = self.budget.lock().expect("rate budget lock poisoned");
        budget.remaining = remaining;
        budget.reset_at = Instant::now() + reset_after;
    }

    /// Last known remaining budget (for logging/diagnostics).
    pub fn remaining(&self) -> u32 {
        self.budget
            .lock()
            .expect("rate budget lock poisoned")
            .remaining
    }
}
