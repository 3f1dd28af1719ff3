//! Timestamp parsing for metadata values

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Metadata keys holding a capture timestamp, in priority order
pub const TIMESTAMP_KEYS: &[&str] = &[
    "SubSecCreateDate",
    "SubSecDateTimeOriginal",
    "CreateDate",
    "DateTimeOriginal",
];

/// `YYYY-MM-DD HH:MM:SS` or `YYYY:MM:DD HH:MM:SS`, optional `.fraction`,
/// optional timezone offset
static METADATA_DATETIME: OnceLock<Regex> = OnceLock::new();

fn metadata_datetime() -> &'static Regex {
    METADATA_DATETIME.get_or_init(|| {
        Regex::new(
            r"^(?P<year>\d{4})[-:](?P<month>\d{2})[-:](?P<day>\d{2})[ T](?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})(?:\.(?P<subseconds>\d+))?(?:Z|[+-]\d{2}(?::?\d{2})?)?$",
        )
        .expect("valid metadata datetime regex")
    })
}

/// Parse a metadata timestamp into a naive date-time and its verbatim
/// fractional-second digits.
///
/// The timezone offset, when present, is discarded: the result is the wall
/// clock time written in the value.
pub fn parse_metadata_datetime(value: &str) -> Option<(NaiveDateTime, String)> {
    let caps = metadata_datetime().captures(value.trim())?;

    let datetime = NaiveDate::from_ymd_opt(
        caps["year"].parse().ok()?,
        caps["month"].parse().ok()?,
        caps["day"].parse().ok()?,
    )?
    .and_hms_opt(
        caps["hour"].parse().ok()?,
        caps["minute"].parse().ok()?,
        caps["second"].parse().ok()?,
    )?;

    let subseconds = caps
        .name("subseconds")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some((datetime, subseconds))
}
