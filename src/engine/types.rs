//! Engine types
//!
//! Run requests, pipeline stages and run statistics.

use crate::config::{ExtractorConfig, SyncOptions};
use crate::daterange::DateRange;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::output::WrittenTable;
use crate::types::{LoadType, OrganizationId};
use std::fmt;

/// What one run extracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Endpoint mode
    pub endpoint: Endpoint,
    /// Organization filter; empty means discover all administered organizations
    pub organizations: Vec<OrganizationId>,
    /// Date range expressions for time-bound endpoints
    pub sync_options: Option<SyncOptions>,
    /// Destination load type
    pub load_type: LoadType,
}

impl ExtractionRequest {
    /// Create a request for an endpoint with no organization filter
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            organizations: Vec::new(),
            sync_options: None,
            load_type: LoadType::default(),
        }
    }

    /// Restrict the run to these organizations
    #[must_use]
    pub fn with_organizations(mut self, organizations: impl IntoIterator<Item = OrganizationId>) -> Self {
        self.organizations = organizations.into_iter().collect();
        self
    }

    /// Set the date range expressions
    #[must_use]
    pub fn with_sync_options(mut self, options: SyncOptions) -> Self {
        self.sync_options = Some(options);
        self
    }

    /// Set the load type
    #[must_use]
    pub fn with_load_type(mut self, load_type: LoadType) -> Self {
        self.load_type = load_type;
        self
    }

    /// Build the request described by a configuration
    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        let parameters = &config.parameters;
        Ok(Self {
            endpoint: parameters.endpoint()?,
            organizations: parameters.organizations.clone(),
            sync_options: parameters.sync_options.clone(),
            load_type: parameters.destination.load_type,
        })
    }
}

/// Stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Turning `date_from` / `date_to` into a date range
    ResolveDateRange,
    /// Discovering organizations and planning API calls
    BuildCallPlan,
    /// Fetching pages of one call
    Paginate,
    /// Flattening records into rows
    Flatten,
    /// Splitting lifetime statistics into totals and dimension tables
    Fanout,
    /// Mapping records onto a single table
    Passthrough,
    /// Committing tables
    Write,
    /// Run completed and run state updated
    Done,
    /// Run aborted; nothing further is committed
    Failed,
}

impl PipelineStage {
    /// Stage name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveDateRange => "resolve_date_range",
            Self::BuildCallPlan => "build_call_plan",
            Self::Paginate => "paginate",
            Self::Flatten => "flatten",
            Self::Fanout => "fanout",
            Self::Passthrough => "passthrough",
            Self::Write => "write",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether the run has finished, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Organizations in scope
    pub organizations: usize,
    /// API calls executed, follow-up calls included
    pub calls_made: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total records received
    pub records_fetched: usize,
    /// Tables committed
    pub tables_written: usize,
    /// Rows committed across all tables
    pub rows_written: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a call
    pub fn add_call(&mut self) {
        self.calls_made += 1;
    }

    /// Add a page of records
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_fetched += records;
    }

    /// Add a committed table
    pub fn add_table(&mut self, rows: usize) {
        self.tables_written += 1;
        self.rows_written += rows;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Endpoint that was extracted
    pub endpoint: Endpoint,
    /// Resolved date range of time-bound endpoints
    pub date_range: Option<DateRange>,
    /// Tables committed, in creation order
    pub tables: Vec<WrittenTable>,
    /// Run statistics
    pub stats: SyncStats,
}

impl RunReport {
    /// Names of the committed tables
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
