//! Media Dater - a CLI tool that files photos and videos by capture date
//!
//! This library provides functionality for:
//! - Metadata extraction through exiftool
//! - MIME-based classification into images, videos and unknown files
//! - Capture time resolution from metadata or file names
//! - Template-driven destination paths
//! - Content-aware collision handling and duplicate detection
//! - XMP sidecar pairing

pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod media;
pub mod metadata;
pub mod path;
pub mod process;
pub mod report;
pub mod sidecar;
pub mod time;
pub mod transfer;

pub use cli::Cli;
pub use config::{Config, ConfigError, OutputRoots, TransferStrategy};
pub use error::{Error, Result};
pub use media::MediaCategory;
pub use metadata::{ExifToolProvider, MetadataProvider, MetadataRecord};
pub use process::Processor;
pub use report::{FileEvent, Reporter, RunStats, TracingReporter};
