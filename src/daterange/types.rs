//! Date range type

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fmt;

/// A half-open `[start, end)` interval aligned to whole UTC days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Create a date range, rejecting `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange {
                start: start.to_rfc3339_opts(SecondsFormat::Secs, false),
                end: end.to_rfc3339_opts(SecondsFormat::Secs, false),
            });
        }
        Ok(Self { start, end })
    }

    /// Inclusive start instant
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Start day
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// End day (excluded from the range)
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Number of whole days covered by the range
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether the range covers no day at all
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Rest.li time range literal, in epoch milliseconds
    ///
    /// `(start:1672531200000,end:1672704000000)`
    pub fn to_restli(&self) -> String {
        format!(
            "(start:{},end:{})",
            self.start.timestamp_millis(),
            self.end.timestamp_millis()
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_date(), self.end_date())
    }
}
