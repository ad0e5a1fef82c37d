//! Error types for the LinkedIn Pages extractor
//!
//! Every public API returns `Result<T, Error>`. Variants are grouped into the
//! three categories the pipeline reports to operators (see [`ErrorKind`]):
//! configuration problems, upstream API failures, and data shape violations.

use thiserror::Error;

/// The main error type for the extractor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error(
        "Could not parse '{value}' into a date for '{field}'. Use a fixed date such as \
         \"1982-09-13\" or a relative expression such as \"7 days ago\" or \"today\""
    )]
    InvalidDate { field: String, value: String },

    #[error("Start of the date range ({start}) is later than its end ({end})")]
    InvalidDateRange { start: String, end: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Upstream (HTTP) Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed API response: {message}")]
    MalformedResponse { message: String },

    // ============================================================================
    // Data Shape Errors
    // ============================================================================
    #[error("Table '{table}': {message} (column '{column}')")]
    DataShape {
        table: String,
        column: String,
        message: String,
    },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Pipeline context
    // ============================================================================
    #[error("Extraction of '{endpoint}' failed{}: {source}", describe_scope(.organization.as_deref(), .date_range.as_deref()))]
    Extraction {
        endpoint: String,
        organization: Option<String>,
        date_range: Option<String>,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Error category reported to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing option, invalid date expression, inconsistent range
    Configuration,
    /// Non-2xx or malformed API response, transport failure
    Upstream,
    /// A record lacks a key needed for its table's primary key
    DataShape,
    /// Anything else (I/O, output, state persistence)
    Internal,
}

fn describe_scope(organization: Option<&str>, date_range: Option<&str>) -> String {
    match (organization, date_range) {
        (Some(org), Some(range)) => format!(" for {org} over {range}"),
        (Some(org), None) => format!(" for {org}"),
        (None, Some(range)) => format!(" over {range}"),
        (None, None) => String::new(),
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a data shape error
    pub fn data_shape(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataShape {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Wrap an error with the endpoint and scope it happened in
    pub fn in_extraction(
        self,
        endpoint: impl Into<String>,
        organization: Option<String>,
        date_range: Option<String>,
    ) -> Self {
        Self::Extraction {
            endpoint: endpoint.into(),
            organization,
            date_range,
            source: Box::new(self),
        }
    }

    /// Category of this error, looking through extraction context
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::InvalidDate { .. }
            | Error::InvalidDateRange { .. }
            | Error::YamlParse(_) => ErrorKind::Configuration,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::Timeout { .. }
            | Error::MalformedResponse { .. } => ErrorKind::Upstream,
            Error::DataShape { .. } => ErrorKind::DataShape,
            Error::Extraction { source, .. } => source.kind(),
            _ => ErrorKind::Internal,
        }
    }

    /// Check if this is a configuration (user) error
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the extractor
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
