//! Destination path construction
//!
//! Turns a category and resolved timestamp into the directory and file name
//! a source file should land at. Nothing here touches the file system.

use crate::config::{Config, OutputRoots};
use crate::media::MediaCategory;
use crate::time::ResolvedTimestamp;
use chrono::{NaiveDateTime, NaiveTime};
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Write};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Where a file should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    /// Destination directory (created by the caller)
    pub directory: PathBuf,
    /// Base file name, never containing a path separator
    pub filename: OsString,
}

impl TargetLocation {
    /// Full destination path
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Why a file was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The output root for the category is not configured
    CategoryDisabled(MediaCategory),
    /// The source disappeared before it could be transferred
    SourceVanished(String),
    /// The source already sits at its computed target
    AlreadyInPlace,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CategoryDisabled(category) => {
                write!(f, "output path for {} files is not defined", category)
            }
            SkipReason::SourceVanished(detail) => write!(f, "no such file ({})", detail),
            SkipReason::AlreadyInPlace => write!(f, "already in place"),
        }
    }
}

/// Outcome of path construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Target(TargetLocation),
    Skipped(SkipReason),
}

/// Builds destination paths from output roots and strftime templates
#[derive(Debug, Clone)]
pub struct PathBuilder {
    roots: OutputRoots,
    dir_format: String,
    file_name_format: String,
}

impl PathBuilder {
    pub fn new(
        roots: OutputRoots,
        dir_format: impl Into<String>,
        file_name_format: impl Into<String>,
    ) -> Self {
        Self {
            roots,
            dir_format: dir_format.into(),
            file_name_format: file_name_format.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output.clone(),
            config.dir_format.clone(),
            config.file_name_format.clone(),
        )
    }

    pub fn roots(&self) -> &OutputRoots {
        &self.roots
    }

    /// Compute the destination for a file.
    ///
    /// A disabled category root skips the file outright, even when the
    /// unknown root is configured. Files without a timestamp, unknown files,
    /// and files whose templates fail to render go to the unknown root under
    /// their original, unmodified name.
    pub fn build(
        &self,
        category: MediaCategory,
        timestamp: Option<&ResolvedTimestamp>,
        original_filename: impl AsRef<OsStr>,
    ) -> Route {
        let original_filename = original_filename.as_ref();
        let Some(root) = self.roots.root_for(category) else {
            return Route::Skipped(SkipReason::CategoryDisabled(category));
        };

        if category != MediaCategory::Unknown
            && let Some(ts) = timestamp
            && let Some(location) = self.dated_location(root, ts, original_filename)
        {
            return Route::Target(location);
        }

        match self.roots.root_for(MediaCategory::Unknown) {
            Some(unknown_root) => Route::Target(TargetLocation {
                directory: unknown_root.to_path_buf(),
                filename: original_filename.to_os_string(),
            }),
            None => Route::Skipped(SkipReason::CategoryDisabled(MediaCategory::Unknown)),
        }
    }

    fn dated_location(
        &self,
        root: &Path,
        ts: &ResolvedTimestamp,
        original_filename: &OsStr,
    ) -> Option<TargetLocation> {
        let midnight = ts.instant.date().and_time(NaiveTime::MIN);
        let subdir = render(&midnight, &self.dir_format)?;
        let subdir = subdir.trim_start_matches(['/', MAIN_SEPARATOR]);

        let mut stem = render(&ts.instant, &self.file_name_format)?;
        stem.push_str(&ts.subseconds);
        let stem = stem.to_lowercase();

        if stem.is_empty() || stem.contains(['/', MAIN_SEPARATOR]) {
            return None;
        }

        // Extensions that are not valid UTF-8 are carried over byte for byte
        let mut filename = OsString::from(stem);
        if let Some(ext) = Path::new(original_filename).extension() {
            filename.push(".");
            match ext.to_str() {
                Some(ext) => filename.push(ext.to_lowercase()),
                None => filename.push(ext),
            }
        }

        Some(TargetLocation {
            directory: root.join(subdir),
            filename,
        })
    }
}

/// Render a strftime template, `None` if the template is malformed
fn render(datetime: &NaiveDateTime, template: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", datetime.format(template)).ok()?;
    Some(out)
}
