// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # LinkedIn Pages extractor
//!
//! Extracts organization page analytics, posts and reference taxonomies from
//! the LinkedIn Marketing API into Parquet tables.
//!
//! ## Features
//!
//! - **Endpoint modes**: time-bound and lifetime page, follower and share
//!   statistics, posts with comments and likes, enumerated types, organizations
//! - **Date expressions**: absolute dates, relative expressions and `last run`
//! - **Organization discovery**: every administered organization when none is configured
//! - **Fan-out**: lifetime statistics split into a totals table and one table per dimension
//! - **Parquet output**: one table file plus a manifest per table, committed atomically
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkedin_pages::config::ExtractorConfig;
//! use linkedin_pages::engine::{ExtractionRequest, Pipeline};
//! use linkedin_pages::http::HttpClient;
//! use linkedin_pages::output::ParquetTableWriter;
//! use linkedin_pages::state::FileStateStore;
//!
//! #[tokio::main]
//! async fn main() -> linkedin_pages::Result<()> {
//!     let config = ExtractorConfig::from_file("data/config.json")?;
//!     let client = HttpClient::with_auth(
//!         config.http_client_config(),
//!         config.authorization.to_auth_config()?,
//!     )?;
//!
//!     let pipeline = Pipeline::new(
//!         client,
//!         FileStateStore::new("data/out/state.json"),
//!         ParquetTableWriter::new("data/out"),
//!     );
//!     let report = pipeline.run(&ExtractionRequest::from_config(&config)?).await?;
//!     println!("{:?}", report.table_names());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Pipeline                              │
//! │  ResolveDateRange → BuildCallPlan → Paginate → Flatten/Fanout   │
//! │  → Write → Done                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Routing  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bearer   │ Rest.li   │ start/count   │ Endpoint  │ Arrow       │
//! │ token    │ Retry     │ Stop on short │ Call plan │ Parquet     │
//! │          │ Rate Limit│ page / total  │ Fan-out   │ Manifest    │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Access token handling
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies and page streams
pub mod pagination;

/// Date ranges and date expressions
pub mod daterange;

/// Endpoint modes and API call planning
pub mod endpoint;

/// Record flattening
pub mod flatten;

/// Lifetime statistics fan-out
pub mod fanout;

/// Record projections for share statistics and taxonomies
pub mod projection;

/// In-memory tables
pub mod table;

/// Run state persistence
pub mod state;

/// Arrow/Parquet output
pub mod output;

/// Extraction pipeline
pub mod engine;

/// Extractor configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
