//! Fixed-window request counting per client identity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-identity counter for the current window.
struct RateBucket {
    reset_at: Instant,
    count: u32,
}

/// A fixed-window rate limiter keyed by client identity.
///
/// Counting is approximate and strictly process-local: a deployment running
/// multiple instances gets an independent counter per instance. Acceptable
/// for best-effort bot mitigation, not a global guarantee.
///
/// Stale buckets are not evicted; an identity's bucket is only replaced when
/// that identity sends a request in a later window. Bounded in practice by
/// the client population, unbounded in principle.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, RateBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request for `identity` and report whether it is over limit.
    ///
    /// The first `limit` requests within a window pass; the request that
    /// pushes the count to `limit + 1` is the first one reported limited.
    /// A request arriving at or after the window boundary starts a fresh
    /// window regardless of the prior count.
    pub fn check(&self, identity: &str, limit: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        match buckets.get_mut(identity) {
            Some(bucket) if now < bucket.reset_at => {
                bucket.count += 1;
                bucket.count > limit
            }
            _ => {
                buckets.insert(
                    identity.to_string(),
                    RateBucket {
                        reset_at: now + window,
                        count: 1,
                    },
                );
                false
            }
        }
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.buckets.lock().expect("rate limiter mutex poisoned").len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
