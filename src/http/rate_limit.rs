//! Client-side request throttling
//!
//! LinkedIn enforces per-application and per-member daily quotas and answers
//! bursts with 429s. A `governor` token bucket keeps the request rate under
//! the configured limit before the API has to push back.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::trace;

/// Request rate settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(10)
    }
}

impl RateLimiterConfig {
    /// Create a rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Limit to `requests_per_second`, allowing one second worth of burst
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second)
    }

    /// Token bucket quota; zero values are raised to one
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket in front of every API request
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    bucket: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a rate limiter
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            config: *config,
            bucket: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Settings the limiter was built from
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Take a permit, waiting for the bucket to refill when it is empty
    pub async fn acquire(&self) {
        if self.bucket.check().is_ok() {
            return;
        }
        trace!(
            "Throttling request to {} per second",
            self.config.requests_per_second
        );
        self.bucket.until_ready().await;
    }

    /// Take a permit only if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
