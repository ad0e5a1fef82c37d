//! Extractor configuration
//!
//! The configuration file is JSON, or YAML when its extension is `.yaml` /
//! `.yml`:
//!
//! ```json
//! {
//!   "parameters": {
//!     "organizations": "123, 456",
//!     "endpoints": "page_statistics_time_bound",
//!     "sync_options": {"date_from": "last run", "date_to": "today"},
//!     "destination": {"load_type": "incremental_load"}
//!   },
//!   "authorization": {"access_token": "..."},
//!   "api": {"requests_per_second": 10}
//! }
//! ```

use crate::auth::AuthConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use crate::types::{BackoffType, LoadType, OptionStringExt, OrganizationId};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// What to extract
    pub parameters: Parameters,

    /// Credentials
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// API client settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl ExtractorConfig {
    /// Load a configuration file, choosing the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    /// Parse a JSON configuration
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| Error::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|e| Error::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.parameters.endpoint()?;
        if endpoint.is_time_bound() && self.parameters.sync_options.is_none() {
            return Err(Error::missing_field("parameters.sync_options"));
        }
        if let Some(options) = &self.parameters.sync_options {
            if options.date_from.trim().is_empty() {
                return Err(Error::missing_field("parameters.sync_options.date_from"));
            }
            if options.date_to.trim().is_empty() {
                return Err(Error::missing_field("parameters.sync_options.date_to"));
            }
        }
        if self.api.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "api.requests_per_second",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// HTTP client settings derived from the `api` section
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(&self.api.base_url)
            .api_version(&self.api.version)
            .timeout(Duration::from_secs(self.api.timeout_seconds))
            .max_retries(self.api.max_retries)
            .backoff(
                self.api.backoff,
                Duration::from_millis(self.api.initial_backoff_ms),
                Duration::from_secs(60),
            )
            .rate_limit(RateLimiterConfig::per_second(self.api.requests_per_second))
            .build()
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Organization ids; empty means every organization the token administers
    #[serde(default, deserialize_with = "deserialize_organizations")]
    pub organizations: Vec<OrganizationId>,

    /// Endpoint mode, e.g. `page_statistics_time_bound`
    pub endpoints: String,

    /// Date range of time-bound endpoints
    #[serde(default)]
    pub sync_options: Option<SyncOptions>,

    /// Destination settings
    #[serde(default)]
    pub destination: Destination,
}

impl Parameters {
    /// The selected endpoint mode
    pub fn endpoint(&self) -> Result<Endpoint> {
        self.endpoints.trim().parse()
    }
}

/// `date_from` / `date_to` expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Start of the range, inclusive: a date, a relative phrase or `last run`
    pub date_from: String,

    /// End of the range, exclusive
    #[serde(default = "default_date_to")]
    pub date_to: String,
}

impl SyncOptions {
    /// Create sync options
    pub fn new(date_from: impl Into<String>, date_to: impl Into<String>) -> Self {
        Self {
            date_from: date_from.into(),
            date_to: date_to.into(),
        }
    }
}

fn default_date_to() -> String {
    "today".to_string()
}

/// Destination settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Full or incremental load
    #[serde(default)]
    pub load_type: LoadType,
}

/// Organization ids as written in the configuration
#[derive(Deserialize)]
#[serde(untagged)]
enum OrganizationsInput {
    Text(String),
    Single(OrganizationId),
    List(Vec<OrganizationIdInput>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrganizationIdInput {
    Number(OrganizationId),
    Text(String),
}

/// Accepts `"123, 456"`, `123`, `[123, 456]` or `["123", "456"]`
fn deserialize_organizations<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<OrganizationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<OrganizationsInput>::deserialize(deserializer)?;
    let parse = |s: &str| -> std::result::Result<OrganizationId, D::Error> {
        s.trim().parse::<OrganizationId>().map_err(|_| {
            serde::de::Error::custom(format!("invalid organization id '{}'", s.trim()))
        })
    };

    match input {
        None => Ok(Vec::new()),
        Some(OrganizationsInput::Single(id)) => Ok(vec![id]),
        Some(OrganizationsInput::Text(text)) => text
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(parse)
            .collect(),
        Some(OrganizationsInput::List(ids)) => ids
            .into_iter()
            .map(|id| match id {
                OrganizationIdInput::Number(id) => Ok(id),
                OrganizationIdInput::Text(text) => parse(&text),
            })
            .collect(),
    }
}

// ============================================================================
// Authorization
// ============================================================================

/// Credentials for the LinkedIn API
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// OAuth access token
    #[serde(default, alias = "#access_token")]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for AuthorizationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthorizationConfig {
    /// Authentication to use for API requests
    ///
    /// Fails when no access token is configured.
    pub fn to_auth_config(&self) -> Result<AuthConfig> {
        let token = self.access_token.clone().none_if_empty().ok_or_else(|| {
            Error::config("Access token not available. Retry the authorization process")
        })?;
        Ok(AuthConfig::Bearer { token })
    }
}

// ============================================================================
// API
// ============================================================================

/// LinkedIn API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: String,
    /// `LinkedIn-Version` header value
    pub version: String,
    /// Sustained request rate
    pub requests_per_second: u32,
    /// Retries of transient failures
    pub max_retries: u32,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Backoff strategy between retries
    pub backoff: BackoffType,
    /// First backoff delay
    pub initial_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            requests_per_second: 10,
            max_retries: 3,
            timeout_seconds: 30,
            backoff: BackoffType::Exponential,
            initial_backoff_ms: 500,
        }
    }
}
