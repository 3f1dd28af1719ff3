//! Configuration types for the media dater

use crate::error::Result;
use crate::media::MediaCategory;
use crate::time::DatePattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

/// Default directory layout: `YYYY/MM/DD`
pub fn default_dir_format() -> String {
    ["%Y", "%m", "%d"].join(MAIN_SEPARATOR_STR)
}

/// Default file name template: `YYYYMMDD-hhmmss`
pub const DEFAULT_FILE_NAME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// How a file reaches its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferStrategy {
    /// Copy files to destination, preserving the modification time
    #[default]
    Copy,
    /// Move files to destination
    Move,
    /// Create hard links at the destination
    Link,
}

impl TransferStrategy {
    /// Verb used in log lines and errors
    pub fn verb(&self) -> &'static str {
        match self {
            TransferStrategy::Copy => "copy",
            TransferStrategy::Move => "move",
            TransferStrategy::Link => "link",
        }
    }
}

/// Output root per media category. A `None` root disables the category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRoots {
    #[serde(default)]
    pub images: Option<PathBuf>,
    #[serde(default)]
    pub videos: Option<PathBuf>,
    #[serde(default)]
    pub unknown: Option<PathBuf>,
}

impl OutputRoots {
    /// Images and videos under `output`, unknown files under `output/unknown`
    pub fn under(output: &Path) -> Self {
        Self {
            images: Some(output.to_path_buf()),
            videos: Some(output.to_path_buf()),
            unknown: Some(output.join("unknown")),
        }
    }

    /// Root configured for a category
    pub fn root_for(&self, category: MediaCategory) -> Option<&Path> {
        match category {
            MediaCategory::Image => self.images.as_deref(),
            MediaCategory::Video => self.videos.as_deref(),
            MediaCategory::Unknown => self.unknown.as_deref(),
        }
    }

    /// Enabled roots with their category, images first
    pub fn enabled(&self) -> impl Iterator<Item = (MediaCategory, &Path)> {
        [
            MediaCategory::Image,
            MediaCategory::Video,
            MediaCategory::Unknown,
        ]
        .into_iter()
        .filter_map(|category| self.root_for(category).map(|root| (category, root)))
    }
}

/// Configuration for the media dater
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for media files
    pub input_dir: Option<PathBuf>,

    /// strftime template for the directory below the category root
    pub dir_format: String,

    /// strftime template for the file name (extension is appended)
    pub file_name_format: String,

    /// Regex with named year/month/day/hour/minute/second groups, applied to
    /// file names when metadata has no usable timestamp
    pub date_regex: Option<String>,

    /// Copy, move or link
    pub strategy: TransferStrategy,

    /// Report decisions without touching the file system
    pub dry_run: bool,

    /// Remove input directories left empty by the move strategy
    pub remove_empty_dirs: bool,

    /// File names that are never processed
    pub ignored_files: Vec<String>,

    /// exiftool binary name or path
    pub exiftool: String,

    /// Per-category output roots
    pub output: OutputRoots,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: None,
            dir_format: default_dir_format(),
            file_name_format: DEFAULT_FILE_NAME_FORMAT.to_string(),
            date_regex: None,
            strategy: TransferStrategy::default(),
            dry_run: false,
            remove_empty_dirs: true,
            ignored_files: vec![".DS_Store".into(), "Thumbs.db".into()],
            exiftool: "exiftool".into(),
            output: OutputRoots::default(),
        }
    }
}

impl Config {
    /// Check if a file name is on the ignore list
    pub fn is_ignored(&self, filename: &str) -> bool {
        self.ignored_files.iter().any(|f| f == filename)
    }

    /// Compile the configured date pattern, if any
    pub fn date_pattern(&self) -> Result<Option<DatePattern>> {
        self.date_regex
            .as_deref()
            .map(DatePattern::new)
            .transpose()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        write_config_file(path.as_ref(), &content)
    }

    /// Write the commented sample configuration to a file
    pub fn write_sample<P: AsRef<Path>>(path: P) -> std::result::Result<(), ConfigError> {
        write_config_file(path.as_ref(), &Self::sample_config())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Dater Configuration File
# This file uses TOML format (https://toml.io)

# Directory scanned recursively for media files
input_dir = "/home/me/Camera"

# strftime template for the folders below each output root
dir_format = "%Y/%m/%d"

# strftime template for file names; sub-seconds and the lower-cased
# extension are appended
file_name_format = "%Y%m%d-%H%M%S"

# Optional regex used when metadata carries no capture date.
# Must define the named groups year, month, day, hour, minute and second.
# date_regex = '.*[_-](?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})[_-]?(?P<hour>\d{2})(?P<minute>\d{2})(?P<second>\d{2})'

# Transfer strategy: "copy", "move" or "link" (hard link)
strategy = "copy"

# Show what would be done without touching any file
dry_run = false

# With "move", delete input folders that end up empty
remove_empty_dirs = true

# File names that are never processed
ignored_files = [".DS_Store", "Thumbs.db"]

# exiftool binary name or path
exiftool = "exiftool"

# Output root per category. Leave a category out to skip its files
# entirely; they are NOT routed to the unknown folder.
[output]
images = "/home/me/Sorted"
videos = "/home/me/Sorted"
unknown = "/home/me/Sorted/unknown"
"#
        .to_string()
    }
}

fn write_config_file(path: &Path, content: &str) -> std::result::Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
