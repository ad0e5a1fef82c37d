//! CLI module
//!
//! Command-line interface for running the extractor.
//!
//! # Commands
//!
//! - `run` - Extract the configured endpoint into tables
//! - `check` - Test the access token against the API
//! - `endpoints` - List endpoint modes and the tables they produce

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{exit_code, Runner};
