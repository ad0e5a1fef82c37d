//! Date expression parsing and range resolution

use super::types::DateRange;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Literal accepted for `date_from` meaning "the last successful run"
pub const LAST_RUN: &str = "last run";

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|a|an|one)\s+(day|week|month|year)s?\s+ago$").unwrap()
});

/// Anchor used for `last run` when no run has completed yet (2003-05-05)
pub fn last_run_floor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2003, 5, 5, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Resolves `date_from` / `date_to` expressions into a [`DateRange`]
#[derive(Debug, Clone, Copy)]
pub struct DateRangeResolver {
    /// Instant relative phrases are resolved against
    now: DateTime<Utc>,
    /// Timestamp of the last successful run, if any
    last_run: Option<DateTime<Utc>>,
}

impl DateRangeResolver {
    /// Create a resolver anchored at `now`
    pub fn new(now: DateTime<Utc>, last_run: Option<DateTime<Utc>>) -> Self {
        Self { now, last_run }
    }

    /// Resolve both bounds and validate `start <= end`
    pub fn resolve(&self, date_from: &str, date_to: &str) -> Result<DateRange> {
        let start = if date_from.trim().eq_ignore_ascii_case(LAST_RUN) {
            self.resolve_last_run()
        } else {
            parse_bound("date_from", date_from, self.now)?
        };
        let end = parse_bound("date_to", date_to, self.now)?;

        let range = DateRange::new(start, end)?;
        debug!("Resolved date range {range} from '{date_from}' .. '{date_to}'");
        Ok(range)
    }

    fn resolve_last_run(&self) -> DateTime<Utc> {
        match self.last_run {
            Some(last_run) => start_of_day(last_run),
            None => {
                let floor = last_run_floor();
                warn!(
                    "No previous successful run recorded despite 'last run' being used as the \
                     start of the date range; using {}",
                    floor.date_naive()
                );
                floor
            }
        }
    }
}

fn parse_bound(field: &str, value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    parse_date_expression(value, now)
        .map(start_of_day)
        .ok_or_else(|| Error::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Parse a fixed date or relative phrase, without truncation
pub fn parse_date_expression(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let value = value.to_ascii_lowercase();
    match value.as_str() {
        "now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::days(1)),
        "tomorrow" => return now.checked_add_signed(Duration::days(1)),
        "last week" => return now.checked_sub_signed(Duration::weeks(1)),
        "last month" => return now.checked_sub_months(Months::new(1)),
        "last year" => return now.checked_sub_months(Months::new(12)),
        _ => {}
    }

    let caps = RELATIVE_RE.captures(&value)?;
    let amount: u32 = match &caps[1] {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };
    match &caps[2] {
        "day" => now.checked_sub_signed(Duration::days(i64::from(amount))),
        "week" => now.checked_sub_signed(Duration::weeks(i64::from(amount))),
        "month" => now.checked_sub_months(Months::new(amount)),
        "year" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}
