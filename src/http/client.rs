//! HTTP client with retry and rate limiting
//!
//! Provides the LinkedIn REST client that handles:
//! - Automatic retries with configurable backoff
//! - Rate limiting to prevent API throttling
//! - Error classification for retry decisions

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use reqwest::{Client, Method, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Default LinkedIn REST API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.linkedin.com/v2";

/// Default `LinkedIn-Version` header value
pub const DEFAULT_API_VERSION: &str = "202208";

/// Rest.li protocol version sent with every request
pub const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let default_headers = HashMap::from([
            (
                "X-Restli-Protocol-Version".to_string(),
                RESTLI_PROTOCOL_VERSION.to_string(),
            ),
            ("LinkedIn-Version".to_string(), DEFAULT_API_VERSION.to_string()),
        ]);
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers,
            user_agent: format!("linkedin-pages-extractor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set the `LinkedIn-Version` header
    pub fn api_version(self, version: impl Into<String>) -> Self {
        self.header("LinkedIn-Version", version)
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Outcome of a single request attempt
enum Attempt {
    /// Final response
    Done(Response),
    /// Transient failure, worth another attempt after `delay`
    Retry { delay: Duration, error: Error },
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = Some(Authenticator::new(auth_config));
        Ok(client)
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url).await
    }

    /// Make a request, retrying transient failures
    ///
    /// A rejected access token (401) is not retried; its body is part of the
    /// returned error.
    pub async fn request(&self, method: Method, url: &str) -> Result<Response> {
        let full_url = self.build_url(url);
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match self.attempt(&method, &full_url, attempt).await? {
                Attempt::Done(response) => {
                    debug!("{method} {full_url} -> {}", response.status());
                    return Ok(response);
                }
                Attempt::Retry { delay, error } => {
                    if attempt >= max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    warn!(
                        "{method} {full_url} failed ({error}), retry {attempt}/{max_retries} in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Send one request and classify the outcome
    async fn attempt(&self, method: &Method, url: &str, attempt: u32) -> Result<Attempt> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let mut req = self
            .client
            .request(method.clone(), url)
            .timeout(self.config.timeout);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(auth) = &self.authenticator {
            req = auth.apply(req);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Ok(Attempt::Retry {
                    delay: self.calculate_backoff(attempt),
                    error: Error::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    },
                });
            }
            Err(e) if e.is_connect() => {
                return Ok(Attempt::Retry {
                    delay: self.calculate_backoff(attempt),
                    error: Error::Http(e),
                });
            }
            Err(e) => return Err(Error::Http(e)),
        };

        let status = response.status();
        if !status.is_client_error() && !status.is_server_error() {
            return Ok(Attempt::Done(response));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = extract_retry_after(&response);
            return Ok(Attempt::Retry {
                delay: Duration::from_secs(retry_after),
                error: Error::RateLimited {
                    retry_after_seconds: retry_after,
                },
            });
        }

        let body = response.text().await.unwrap_or_default();
        let error = Error::http_status(status.as_u16(), describe_failure(method, url, &body));
        if error.is_retryable() {
            Ok(Attempt::Retry {
                delay: self.calculate_backoff(attempt),
                error,
            })
        } else {
            Err(error)
        }
    }

    /// Make a GET request and parse the JSON response
    ///
    /// A body that is not JSON is reported as a malformed response.
    pub async fn get_json(&self, url: &str) -> Result<JsonValue> {
        let response = self.get(url).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::malformed(format!(
                "response of {url} is not valid JSON ({e}): {}",
                truncate(&text, 200)
            ))
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay for a given attempt, capped at `max_backoff`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let initial = self.config.initial_backoff;
        let delay = match self.config.backoff_type {
            BackoffType::Constant => Some(initial),
            BackoffType::Linear => initial.checked_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.checked_mul(2u32.saturating_pow(attempt)),
        };

        delay.map_or(self.config.max_backoff, |delay| {
            std::cmp::min(delay, self.config.max_backoff)
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}

/// Failure message carrying the request and, when present, the response body
fn describe_failure(method: &Method, url: &str, body: &str) -> String {
    if body.trim().is_empty() {
        format!("{method} {url}")
    } else {
        format!("{method} {url}\nResponse content: {}", body.trim())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
