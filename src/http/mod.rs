//! HTTP client module
//!
//! Provides the LinkedIn REST client with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Rest.li headers**: `X-Restli-Protocol-Version` and `LinkedIn-Version`
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;
mod transport;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, DEFAULT_API_VERSION, DEFAULT_BASE_URL,
    RESTLI_PROTOCOL_VERSION,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::Transport;
