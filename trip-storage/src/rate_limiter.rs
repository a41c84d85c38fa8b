//! Sliding-window rate limiter shared across requests. `acquire` is a
//! non-blocking check-and-increment; callers that fail to acquire treat the
//! operation as unavailable rather than queuing or retrying.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-bucket limits over a 1-second and a 60-second window.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    pub per_second: u32,
    pub per_minute: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            per_second: 20,
            per_minute: 300,
        }
    }
}

/// Tracks operation timestamps per logical bucket ("read", "write", ...).
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Records one operation in `bucket` if both windows have capacity.
    /// Returns false when either window is full; the caller must treat the
    /// guarded operation as unavailable.
    pub fn acquire(&self, bucket: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = buckets.entry(bucket.to_string()).or_default();

        while let Some(front) = window.front() {
            if now.duration_since(*front) >= Duration::from_secs(60) {
                window.pop_front();
            } else {
                break;
            }
        }

        let last_second = window
            .iter()
            .rev()
            .take_while(|t| now.duration_since(**t) < Duration::from_secs(1))
            .count();

        if last_second >= self.config.per_second as usize
            || window.len() >= self.config.per_minute as usize
        {
            return false;
        }

        window.push_back(now);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_within_limits() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            per_second: 2,
            per_minute: 10,
        });
        assert!(limiter.acquire("read"));
        assert!(limiter.acquire("read"));
        assert!(!limiter.acquire("read"));
        // Independent bucket has its own window.
        assert!(limiter.acquire("write"));
    }

    #[test]
    fn zero_capacity_always_denies() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            per_second: 0,
            per_minute: 0,
        });
        assert!(!limiter.acquire("read"));
    }
}
