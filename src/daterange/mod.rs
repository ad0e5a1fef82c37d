//! Date range resolution
//!
//! Turns the user supplied `date_from` / `date_to` expressions into a concrete,
//! day-aligned, half-open [`DateRange`].
//!
//! # Supported expressions
//!
//! - Fixed dates: `2023-01-31` (or a full RFC 3339 timestamp)
//! - Relative phrases: `now`, `today`, `yesterday`, `7 days ago`, `last month`, ...
//! - `last run` (for `date_from` only): the date of the last successful run,
//!   or 2003-05-05 when there was none

mod resolver;
mod types;

pub use resolver::{last_run_floor, parse_date_expression, DateRangeResolver, LAST_RUN};
pub use types::DateRange;

#[cfg(test)]
mod tests;
