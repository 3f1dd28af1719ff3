//! File transfer for the copy, move and link strategies
//!
//! Every transfer is a single whole-file operation: a rename, a hard link or
//! a complete copy. The caller creates the destination directory.

use crate::config::TransferStrategy;
use crate::error::{Error, Result};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

impl TransferStrategy {
    /// Transfer `source` to `target`
    pub fn transfer(&self, source: &Path, target: &Path) -> Result<()> {
        let outcome = match self {
            TransferStrategy::Copy => copy_preserving_times(source, target),
            TransferStrategy::Move => move_file(source, target),
            TransferStrategy::Link => fs::hard_link(source, target),
        };

        outcome.map_err(|e| Error::Transfer {
            strategy: self.verb(),
            source_path: source.to_path_buf(),
            target: target.to_path_buf(),
            source: e,
        })
    }

    /// Delete a source whose identical copy already exists at the
    /// destination. Only the move strategy removes anything.
    pub fn discard_duplicate(&self, source: &Path) -> Result<bool> {
        if *self != TransferStrategy::Move {
            return Ok(false);
        }
        fs::remove_file(source)?;
        debug!(?source, "Removed duplicate source");
        Ok(true)
    }
}

/// Whether an error from [`TransferStrategy::transfer`] means the source is gone
pub fn is_source_missing(error: &Error) -> bool {
    matches!(error, Error::Transfer { source, source_path, .. }
        if source.kind() == io::ErrorKind::NotFound && !source_path.exists())
}

/// Copy file contents and carry over access and modification times
fn copy_preserving_times(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target)?;

    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    if let Err(e) = filetime::set_file_times(target, atime, mtime) {
        warn!(?target, error = %e, "Failed to preserve file times");
    }
    Ok(())
}

/// Rename, falling back to copy + delete across file systems
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(e) => {
            debug!(?source, ?target, error = %e, "Rename failed, copying instead");
            copy_preserving_times(source, target)?;
            fs::remove_file(source)
        }
    }
}
