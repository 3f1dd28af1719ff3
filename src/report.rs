//! Per-file decisions and run totals
//!
//! The processor reports every decision through a [`Reporter`] handed to it
//! by the caller, keeping presentation out of the sorting logic.

use crate::media::MediaCategory;
use crate::path::SkipReason;
use crate::time::ResolvedTimestamp;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// One decision about one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// The file was (or in a dry run, would be) written to `target`
    Transferred {
        source: PathBuf,
        target: PathBuf,
        category: MediaCategory,
        timestamp: Option<ResolvedTimestamp>,
        dry_run: bool,
    },
    /// An identical copy already exists at `existing`
    Duplicate {
        source: PathBuf,
        existing: PathBuf,
        category: MediaCategory,
        removed: bool,
    },
    /// The file was left untouched
    Skipped { source: PathBuf, reason: SkipReason },
    /// A sidecar followed its primary file
    Sidecar {
        source: PathBuf,
        target: PathBuf,
        dry_run: bool,
    },
    /// Processing the file failed; the run continues
    Failed { source: PathBuf, error: String },
}

/// Receives processing decisions
pub trait Reporter {
    /// Called once per decision, in processing order
    fn file_event(&mut self, event: &FileEvent);

    /// Called once after the last file
    fn run_finished(&mut self, _stats: &RunStats) {}
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    pub images: usize,
    pub videos: usize,
    pub unknown: usize,
    pub sidecars: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an event
    pub fn record(&mut self, event: &FileEvent) {
        match event {
            FileEvent::Transferred { category, .. } => {
                self.processed += 1;
                match category {
                    MediaCategory::Image => self.images += 1,
                    MediaCategory::Video => self.videos += 1,
                    MediaCategory::Unknown => self.unknown += 1,
                }
            }
            FileEvent::Duplicate { .. } => self.duplicates += 1,
            FileEvent::Skipped { .. } => self.skipped += 1,
            FileEvent::Sidecar { .. } => self.sidecars += 1,
            FileEvent::Failed { .. } => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Processed: {} (images: {}, videos: {}, unknown: {}), Sidecars: {}, Duplicates: {}, Skipped: {}, Failed: {}",
            self.processed,
            self.images,
            self.videos,
            self.unknown,
            self.sidecars,
            self.duplicates,
            self.skipped,
            self.failed
        )
    }
}

/// Reporter that turns decisions into tracing events
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn file_event(&mut self, event: &FileEvent) {
        match event {
            FileEvent::Transferred {
                source,
                target,
                category,
                timestamp,
                dry_run,
            } => {
                let timestamp = timestamp.as_ref().map(|ts| ts.instant.to_string());
                info!(
                    source = ?source,
                    destination = ?target,
                    %category,
                    timestamp = timestamp.as_deref().unwrap_or("unresolved"),
                    dry_run,
                    "Processed file"
                );
            }
            FileEvent::Duplicate {
                source,
                existing,
                removed,
                ..
            } => info!(source = ?source, existing = ?existing, removed, "Duplicate file"),
            FileEvent::Skipped { source, reason } => {
                warn!(source = ?source, %reason, "Skipped file")
            }
            FileEvent::Sidecar {
                source,
                target,
                dry_run,
            } => info!(source = ?source, destination = ?target, dry_run, "Processed sidecar"),
            FileEvent::Failed { source, error } => {
                error!(source = ?source, error = %error, "Failed to process file")
            }
        }
    }

    fn run_finished(&mut self, stats: &RunStats) {
        info!("{}", stats.summary());
    }
}
