//! Event date parsing and display
//!
//! Event dates travel as ISO-8601 strings. Parsing is lenient about the exact
//! shape (full RFC 3339, local datetime, bare date) because records written by
//! older clients were never migrated.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Display sentinel for dates that do not parse
pub const INVALID_DATE: &str = "Invalid Date";

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse an event date string into a UTC instant
///
/// Accepts RFC 3339 (`2024-02-05T10:00:00.000Z`), offset-less datetimes
/// (interpreted as UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
/// Returns `None` for anything else, including the empty string.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Calendar day of an event date (time of day truncated)
pub fn event_day(raw: &str) -> Option<NaiveDate> {
    parse_event_date(raw).map(|dt| dt.date_naive())
}

/// Render a timestamp the way browsers emit `toISOString()`
pub fn to_iso_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Human display form (`YYYY-MM-DD`), or [`INVALID_DATE`]
pub fn display_date(raw: &str) -> String {
    match parse_event_date(raw) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => INVALID_DATE.to_string(),
    }
}
