//! Date/time helpers for timestamps stored by SQLite.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// SQLite `datetime('now')` output format.
const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a stored timestamp (SQLite format or RFC3339) as UTC.
pub fn parse_stored(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, SQLITE_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(datetime_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a stored timestamp to RFC3339 (e.g. "2024-01-15T10:30:00Z").
///
/// Returns the input unchanged if it cannot be parsed.
pub fn to_rfc3339(datetime_str: &str) -> String {
    match parse_stored(datetime_str) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => datetime_str.to_string(),
    }
}
