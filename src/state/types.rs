//! Run state types

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted run state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Start of the last fully successful run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl RunState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// State recording a successful run at `at`
    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self { last_run: Some(at) }
    }
}

/// Storage for the last successful run timestamp
#[async_trait]
pub trait RunStateStore: Send + Sync {
    /// Timestamp of the last successful run, `None` before the first one
    async fn read_last_run(&self) -> Result<Option<DateTime<Utc>>>;

    /// Record a successful run
    async fn write_last_run(&self, at: DateTime<Utc>) -> Result<()>;
}
