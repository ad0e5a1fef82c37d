//! Run state stores
//!
//! Provides file-based state persistence with atomic writes.

use super::types::{RunState, RunStateStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

// ============================================================================
// File store
// ============================================================================

/// Run state kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`; the file need not exist yet
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state document, empty when the file is absent
    pub async fn load(&self) -> Result<RunState> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(RunState::new());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
        if contents.trim().is_empty() {
            return Ok(RunState::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))
    }

    /// Save the state document
    pub async fn save(&self, state: &RunState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::state(format!("Failed to create state directory: {e}")))?;
        }

        // Temp file, then rename over the previous state
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!("Saved run state to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl RunStateStore for FileStateStore {
    async fn read_last_run(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load().await?.last_run)
    }

    async fn write_last_run(&self, at: DateTime<Utc>) -> Result<()> {
        self.save(&RunState::completed_at(at)).await
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Run state held in memory
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<RunState>,
}

impl InMemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already recorded a run
    pub fn with_last_run(at: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(RunState::completed_at(at)),
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl RunStateStore for InMemoryStateStore {
    async fn read_last_run(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.state.read().await.last_run)
    }

    async fn write_last_run(&self, at: DateTime<Utc>) -> Result<()> {
        *self.state.write().await = RunState::completed_at(at);
        Ok(())
    }
}
