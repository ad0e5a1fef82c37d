//! Tests for date range resolution

use super::*;
use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use test_case::test_case;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 15, 13, 45, 10).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Expression Parsing
// ============================================================================

#[test_case("2023-01-01", day(2023, 1, 1) ; "fixed date")]
#[test_case("today", day(2023, 3, 15) ; "today")]
#[test_case("now", day(2023, 3, 15) ; "now")]
#[test_case("Yesterday", day(2023, 3, 14) ; "yesterday any case")]
#[test_case("7 days ago", day(2023, 3, 8) ; "days ago")]
#[test_case("1 day ago", day(2023, 3, 14) ; "singular day")]
#[test_case("2 weeks ago", day(2023, 3, 1) ; "weeks ago")]
#[test_case("a month ago", day(2023, 2, 15) ; "a month ago")]
#[test_case("3 months ago", day(2022, 12, 15) ; "months ago")]
#[test_case("1 year ago", day(2022, 3, 15) ; "years ago")]
#[test_case("last week", day(2023, 3, 8) ; "last week")]
#[test_case("2023-02-01T10:00:00Z", day(2023, 2, 1) ; "rfc3339")]
fn test_parse_date_expression(expr: &str, expected: NaiveDate) {
    let parsed = parse_date_expression(expr, now()).unwrap();
    assert_eq!(parsed.date_naive(), expected);
}

#[test_case("soon" ; "word")]
#[test_case("2023-13-01" ; "bad month")]
#[test_case("" ; "empty")]
#[test_case("days ago" ; "missing amount")]
fn test_parse_date_expression_rejects(expr: &str) {
    assert!(parse_date_expression(expr, now()).is_none());
}

// ============================================================================
// Range Resolution
// ============================================================================

#[test]
fn test_resolve_truncates_to_day_boundaries() {
    let resolver = DateRangeResolver::new(now(), None);
    let range = resolver.resolve("7 days ago", "today").unwrap();

    for bound in [range.start(), range.end()] {
        assert_eq!(bound.hour(), 0);
        assert_eq!(bound.minute(), 0);
        assert_eq!(bound.second(), 0);
        assert_eq!(bound.nanosecond(), 0);
    }
    assert!(range.start() <= range.end());
    assert_eq!(range.days(), 7);
}

#[test]
fn test_resolve_fixed_range_is_half_open() {
    let resolver = DateRangeResolver::new(now(), None);
    let range = resolver.resolve("2023-01-01", "2023-01-03").unwrap();

    assert_eq!(range.start_date(), day(2023, 1, 1));
    assert_eq!(range.end_date(), day(2023, 1, 3));
    assert_eq!(range.days(), 2);
    assert_eq!(range.to_string(), "[2023-01-01, 2023-01-03)");
}

#[test]
fn test_last_run_without_prior_run_uses_floor() {
    let resolver = DateRangeResolver::new(now(), None);
    let range = resolver.resolve("last run", "today").unwrap();
    assert_eq!(range.start_date(), day(2003, 5, 5));
    assert_eq!(last_run_floor().date_naive(), day(2003, 5, 5));
}

#[test]
fn test_last_run_with_prior_run_uses_its_date() {
    let last = Utc.with_ymd_and_hms(2023, 2, 20, 18, 30, 0).unwrap();
    let resolver = DateRangeResolver::new(now(), Some(last));
    let range = resolver.resolve("Last Run", "today").unwrap();
    assert_eq!(range.start(), Utc.with_ymd_and_hms(2023, 2, 20, 0, 0, 0).unwrap());
}

#[test]
fn test_unparseable_date_from_is_configuration_error() {
    let resolver = DateRangeResolver::new(now(), None);
    let err = resolver.resolve("whenever", "today").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("date_from"));
}

#[test]
fn test_last_run_is_not_accepted_for_date_to() {
    let resolver = DateRangeResolver::new(now(), None);
    let err = resolver.resolve("2023-01-01", "last run").unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_inverted_range_is_configuration_error() {
    let resolver = DateRangeResolver::new(now(), None);
    let err = resolver.resolve("2023-03-10", "2023-03-01").unwrap_err();
    assert!(matches!(err, crate::Error::InvalidDateRange { .. }));
    assert!(err.is_configuration());
}

#[test]
fn test_empty_range_is_allowed() {
    let resolver = DateRangeResolver::new(now(), None);
    let range = resolver.resolve("today", "today").unwrap();
    assert!(range.is_empty());
}

#[test]
fn test_restli_literal_uses_epoch_millis() {
    let resolver = DateRangeResolver::new(now(), None);
    let range = resolver.resolve("2023-01-01", "2023-01-03").unwrap();
    assert_eq!(
        range.to_restli(),
        "(start:1672531200000,end:1672704000000)"
    );
}
