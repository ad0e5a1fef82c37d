//! Run state module
//!
//! Tracks when the extractor last completed successfully. The timestamp
//! anchors `"last run"` date ranges and is written once, after every table of
//! a run has been committed.
//!
//! # Overview
//!
//! - [`RunState`] - The persisted document, `{"last_run": "<RFC 3339>"}`
//! - [`RunStateStore`] - Read/write seam used by the pipeline
//! - [`FileStateStore`] - JSON file persistence with atomic writes
//! - [`InMemoryStateStore`] - Store for tests and dry runs

mod manager;
mod types;

pub use manager::{FileStateStore, InMemoryStateStore};
pub use types::{RunState, RunStateStore};
