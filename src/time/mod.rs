//! Capture timestamp resolution
//!
//! The timestamp of a file is resolved from, in order:
//! - a timestamp key in its metadata record
//! - a user supplied pattern applied to its file name
//!
//! When neither yields a valid date the file is [`Resolution::Unresolved`];
//! there is no file system time fallback.

pub mod filename;
pub mod format;
pub mod metadata;

use crate::metadata::MetadataRecord;
use chrono::NaiveDateTime;
use tracing::{debug, trace};

pub use filename::DatePattern;
pub use format::parse_date_format;

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Read from the named metadata key
    Metadata(&'static str),
    /// Parsed from the filename with the custom pattern
    Filename,
}

/// A successfully resolved capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    /// Timezone-naive wall clock time
    pub instant: NaiveDateTime,
    /// Fractional seconds exactly as written in the metadata, possibly empty
    pub subseconds: String,
    /// Where the timestamp came from
    pub source: TimeSource,
}

/// Outcome of timestamp resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTimestamp),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Borrow the timestamp, if one was resolved
    pub fn timestamp(&self) -> Option<&ResolvedTimestamp> {
        match self {
            Resolution::Resolved(ts) => Some(ts),
            Resolution::Unresolved => None,
        }
    }

    pub fn into_timestamp(self) -> Option<ResolvedTimestamp> {
        match self {
            Resolution::Resolved(ts) => Some(ts),
            Resolution::Unresolved => None,
        }
    }
}

/// Resolve the capture time of a file.
///
/// `filename` is the file's name without its directory. A metadata value
/// that fails to parse falls through to the filename pattern instead of
/// failing the file.
pub fn resolve(
    metadata: Option<&MetadataRecord>,
    filename: &str,
    pattern: Option<&DatePattern>,
) -> Resolution {
    if let Some(record) = metadata
        && let Some((key, value)) = metadata::TIMESTAMP_KEYS
            .iter()
            .find_map(|key| record.get(key).map(|value| (*key, value)))
    {
        match metadata::parse_metadata_datetime(value) {
            Some((instant, subseconds)) => {
                trace!(filename, key, value, "Resolved time from metadata");
                return Resolution::Resolved(ResolvedTimestamp {
                    instant,
                    subseconds,
                    source: TimeSource::Metadata(key),
                });
            }
            None => debug!(filename, key, value, "Unparseable metadata timestamp"),
        }
    }

    if let Some(pattern) = pattern
        && let Some(instant) = pattern.parse(filename)
    {
        trace!(filename, "Resolved time from filename");
        return Resolution::Resolved(ResolvedTimestamp {
            instant,
            subseconds: String::new(),
            source: TimeSource::Filename,
        });
    }

    Resolution::Unresolved
}
