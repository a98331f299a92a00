//! Date-range parsing and splitting
//!
//! The upstream transaction search caps a single query at 31 days.
//! Larger caller ranges are split into consecutive chunks, each within
//! the cap, re-serialized in the timestamp format the upstream expects.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Maximum queryable span for one upstream transaction search
pub const MAX_DATE_RANGE_DAYS: i64 = 31;

/// Timestamp format the upstream expects in query parameters
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a caller-supplied timestamp
///
/// Accepts RFC 3339 (offset or `Z`), a bare datetime taken as UTC, or a
/// bare date taken as midnight UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(parsed.and_time(NaiveTime::MIN).and_utc());
    }
    None
}

/// Whole days between two instants, partial days dropped
pub fn span_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

/// Split `[start, end)` into consecutive chunks of at most 31 days
///
/// Chunks are contiguous: each chunk ends where the next begins, and
/// the final chunk ends exactly at `end`.
pub fn split_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<(String, String)> {
    let mut ranges = Vec::new();
    let mut current_start = start;

    while current_start < end {
        let current_end = std::cmp::min(current_start + Duration::days(MAX_DATE_RANGE_DAYS), end);
        ranges.push((
            format_timestamp(current_start),
            format_timestamp(current_end),
        ));
        current_start = current_end;
    }

    ranges
}

/// Serialize an instant in the upstream's query format
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}
