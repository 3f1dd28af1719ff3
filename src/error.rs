//! Error types for the media dater

use crate::config::ConfigError;
use crate::media::MediaCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media dater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media dater
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input directory {0} does not exist or cannot be accessed")]
    InputMissing(PathBuf),

    #[error("Cannot create output directory for {category} files at {path}: {source}")]
    OutputUnwritable {
        category: MediaCategory,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to {strategy} {source_path} to {target}: {source}")]
    Transfer {
        strategy: &'static str,
        source_path: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to extract metadata from {path}: {message}")]
    MetadataExtraction { path: PathBuf, message: String },

    #[error("exiftool not found. Please install exiftool and ensure it is in PATH")]
    ExifToolNotFound,

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
