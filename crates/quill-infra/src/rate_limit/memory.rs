//! In-memory keyed rate limiter using the governor crate.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Forget idle keys once the table grows past this many entries.
const RETAIN_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per key per minute (also the burst size).
    pub per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { per_minute: 10 }
    }
}

impl RateLimitConfig {
    /// Read `COMMENT_RATE_LIMIT_PER_MINUTE`.
    pub fn from_env() -> Self {
        Self {
            per_minute: std::env::var("COMMENT_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}

/// Per-key GCRA rate limiter (one bucket per user, for example).
///
/// Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.per_minute).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(RateLimitConfig::from_env())
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        if self.limiter.len() > RETAIN_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(RateLimitResult {
                allowed: true,
                reset_after: std::time::Duration::ZERO,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_then_throttle_per_key() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig { per_minute: 2 });

        assert!(limiter.check("alice").await.unwrap().allowed);
        assert!(limiter.check("alice").await.unwrap().allowed);

        let third = limiter.check("alice").await.unwrap();
        assert!(!third.allowed);
        assert!(third.reset_after.as_secs() <= 60);

        assert!(limiter.check("bob").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn zero_quota_falls_back_to_one() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig { per_minute: 0 });
        assert!(limiter.check("k").await.unwrap().allowed);
        assert!(!limiter.check("k").await.unwrap().allowed);
    }
}
