//! Filename timestamp parsing with a user supplied pattern

use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::trace;

/// Named groups a date pattern must capture
pub const REQUIRED_GROUPS: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];

/// Regex with named `year`, `month`, `day`, `hour`, `minute` and `second`
/// groups, matched against a file name
#[derive(Debug, Clone)]
pub struct DatePattern {
    regex: Regex,
}

impl DatePattern {
    /// Compile a pattern.
    ///
    /// A pattern lacking some of the required groups still compiles; it
    /// simply never yields a timestamp. Use [`DatePattern::missing_groups`]
    /// to warn about it up front.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Required groups the pattern does not define
    pub fn missing_groups(&self) -> Vec<&'static str> {
        REQUIRED_GROUPS
            .iter()
            .copied()
            .filter(|group| !self.regex.capture_names().flatten().any(|name| name == *group))
            .collect()
    }

    /// Parse a timestamp out of a file name.
    ///
    /// Returns `None` when the pattern does not match, when any required group
    /// did not participate in the match, or when the captured fields do not
    /// form a valid date and time.
    pub fn parse(&self, filename: &str) -> Option<NaiveDateTime> {
        let caps = self.regex.captures(filename)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str());

        let dt = build_datetime(
            field("year")?,
            field("month")?,
            field("day")?,
            field("hour")?,
            field("minute")?,
            field("second")?,
        );
        if dt.is_some() {
            trace!(filename, pattern = self.as_str(), "Matched date pattern");
        }
        dt
    }
}

fn build_datetime(
    year: &str,
    month: &str,
    day: &str,
    hour: &str,
    minute: &str,
    second: &str,
) -> Option<NaiveDateTime> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let second: u32 = second.parse().ok()?;

    // Range checks are left to chrono
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}
