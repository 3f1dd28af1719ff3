//! Collision handling at the destination
//!
//! A candidate name that is free is used as is. An occupied name holding a
//! byte-identical copy of the source marks the source as a duplicate. Any
//! other occupied name moves on to the next numeric suffix. A source that
//! already sits at a candidate is left where it is.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Read size for content comparison
const COMPARE_CHUNK: usize = 64 * 1024;

/// Final decision for a candidate destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// The base path is free
    UseDirectly(PathBuf),
    /// The base path is taken by different content; `path` is the first free
    /// suffixed name
    UseSuffixed { suffix: u32, path: PathBuf },
    /// An identical copy of the source already exists at this path
    DuplicateOf(PathBuf),
    /// The candidate is the source file itself
    AlreadyInPlace(PathBuf),
}

impl CollisionOutcome {
    /// Suffix allocated to the target, 0 when none
    pub fn suffix(&self) -> u32 {
        match self {
            CollisionOutcome::UseSuffixed { suffix, .. } => *suffix,
            _ => 0,
        }
    }

    /// Path the source should be transferred to, `None` when nothing moves
    pub fn target(&self) -> Option<&Path> {
        match self {
            CollisionOutcome::UseDirectly(path) => Some(path),
            CollisionOutcome::UseSuffixed { path, .. } => Some(path),
            CollisionOutcome::DuplicateOf(_) | CollisionOutcome::AlreadyInPlace(_) => None,
        }
    }
}

/// File system queries used while probing candidates
pub trait CandidateProbe {
    /// Whether anything occupies `path`
    fn exists(&self, path: &Path) -> bool;

    /// Whether `candidate` names the same file as `source`
    fn same_file(&self, source: &Path, candidate: &Path) -> bool;

    /// Whether `source` and `existing` have identical content
    fn identical(&self, source: &Path, existing: &Path) -> io::Result<bool>;
}

/// Probe backed by the real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemProbe;

impl CandidateProbe for FileSystemProbe {
    fn exists(&self, path: &Path) -> bool {
        // A dangling symlink still occupies the name
        fs::symlink_metadata(path).is_ok()
    }

    fn same_file(&self, source: &Path, candidate: &Path) -> bool {
        match (fs::canonicalize(source), fs::canonicalize(candidate)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn identical(&self, source: &Path, existing: &Path) -> io::Result<bool> {
        if !existing.is_file() {
            return Ok(false);
        }
        files_identical(source, existing)
    }
}

/// Insert `-NNN` before the extension of `base`
pub fn suffixed_path(base: &Path, suffix: u32) -> PathBuf {
    if suffix == 0 {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}-{:03}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}-{:03}", stem, suffix),
    };
    base.with_file_name(name)
}

/// Compare two files for exact equality: size first, then content
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(COMPARE_CHUNK, File::open(a)?);
    let mut reader_b = BufReader::with_capacity(COMPARE_CHUNK, File::open(b)?);

    loop {
        let (n, equal) = {
            let buf_a = reader_a.fill_buf()?;
            let buf_b = reader_b.fill_buf()?;
            if buf_a.is_empty() || buf_b.is_empty() {
                return Ok(buf_a.is_empty() && buf_b.is_empty());
            }
            let n = buf_a.len().min(buf_b.len());
            (n, buf_a[..n] == buf_b[..n])
        };
        if !equal {
            return Ok(false);
        }
        reader_a.consume(n);
        reader_b.consume(n);
    }
}

/// Resolve the final destination for `source` against the real file system
pub fn resolve_collision(source: &Path, base: &Path) -> io::Result<CollisionOutcome> {
    resolve_collision_with(source, base, &FileSystemProbe)
}

/// Resolve the final destination for `source` using `probe`.
///
/// Suffixes are always derived from `base`, never from the previous
/// candidate, so the sequence is `base`, `base-001`, `base-002`, ...
pub fn resolve_collision_with<P: CandidateProbe>(
    source: &Path,
    base: &Path,
    probe: &P,
) -> io::Result<CollisionOutcome> {
    let mut suffix: u32 = 0;

    loop {
        let candidate = suffixed_path(base, suffix);

        if !probe.exists(&candidate) {
            trace!(?candidate, suffix, "Found free target name");
            return Ok(if suffix == 0 {
                CollisionOutcome::UseDirectly(candidate)
            } else {
                CollisionOutcome::UseSuffixed {
                    suffix,
                    path: candidate,
                }
            });
        }

        if probe.same_file(source, &candidate) {
            debug!(?source, "Source already sits at its target");
            return Ok(CollisionOutcome::AlreadyInPlace(candidate));
        }

        if probe.identical(source, &candidate)? {
            debug!(?source, existing = ?candidate, "Identical file already at target");
            return Ok(CollisionOutcome::DuplicateOf(candidate));
        }

        suffix = suffix.checked_add(1).ok_or_else(|| {
            io::Error::other(format!("ran out of suffixes for {}", base.display()))
        })?;
    }
}
