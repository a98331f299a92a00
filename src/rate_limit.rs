//! Per-caller admission control
//!
//! Fixed-window request counting keyed by caller identity (the client IP
//! at the HTTP boundary). Each key gets at most `limit` admissions per
//! window; when the window boundary passes, counting restarts from one.
//!
//! Windows are kept for every caller key ever seen; stale keys are not
//! evicted. The limiter is local to this process.

use chrono::{DateTime, Duration as TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Admissions left in the current window after this check
    pub remaining: u32,
    /// Instant at which the current window ends and the count restarts
    pub reset_at: DateTime<Utc>,
}

/// One caller's consumption within the current window
struct RateWindow {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Keyed fixed-window rate limiter
///
/// Increment-and-compare runs under a single mutex over the key map, so
/// two concurrent checks for the same key can never both slip past the
/// quota.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    limit: u32,
    window_secs: i64,
    windows: Arc<Mutex<HashMap<String, RateWindow>>>,
}

impl FixedWindowLimiter {
    /// Create a limiter admitting `limit` requests per `window` per key
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window_secs: window.as_secs() as i64,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether a request from `key` is admitted right now
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    /// Admission check against an explicit instant
    pub(crate) fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let window = TimeDelta::seconds(self.window_secs);
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match windows.get_mut(key) {
            Some(entry) if now < entry.window_start + window => {
                let reset_at = entry.window_start + window;
                if entry.count < self.limit {
                    entry.count += 1;
                    RateLimitDecision {
                        allowed: true,
                        remaining: self.limit - entry.count,
                        reset_at,
                    }
                } else {
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at,
                    }
                }
            }
            // First request from this key, or its window has expired
            _ => {
                windows.insert(
                    key.to_string(),
                    RateWindow {
                        count: 1,
                        window_start: now,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: self.limit.saturating_sub(1),
                    reset_at: now + window,
                }
            }
        }
    }

    /// Configured per-window quota
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of caller keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for FixedWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWindowLimiter")
            .field("limit", &self.limit)
            .field("window_secs", &self.window_secs)
            .finish()
    }
}
