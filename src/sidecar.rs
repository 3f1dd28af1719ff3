//! XMP sidecar pairing
//!
//! A sidecar travels with its primary file. It is found either as
//! `photo.jpg.xmp` (appended) or `photo.xmp` (replaced), and is renamed the
//! same way at the destination, carrying the primary's numeric suffix.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Sidecar file extension (lowercase)
pub const SIDECAR_EXTENSION: &str = "xmp";

/// How the sidecar name relates to its primary file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarKind {
    /// `photo.jpg.xmp`
    Appended,
    /// `photo.xmp`
    Replaced,
}

/// A sidecar to transfer alongside its primary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarPlan {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: SidecarKind,
}

/// Check if a file is a sidecar based on its extension
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == SIDECAR_EXTENSION)
}

/// Locate the sidecar of `source` and compute its destination.
///
/// `base_filename` is the primary's target name before suffix allocation and
/// `suffix` the number allocated to it (0 for none). The sidecar carries the
/// suffix as a plain `-n`.
pub fn pair(
    source: &Path,
    base_filename: impl AsRef<OsStr>,
    suffix: u32,
    destination_dir: &Path,
) -> Option<SidecarPlan> {
    let (sidecar, kind) = find_sidecar(source)?;

    let base_filename = base_filename.as_ref();
    let mut name = match kind {
        SidecarKind::Appended => base_filename.to_os_string(),
        SidecarKind::Replaced => Path::new(base_filename)
            .file_stem()
            .unwrap_or(base_filename)
            .to_os_string(),
    };
    if suffix > 0 {
        name.push(format!("-{}", suffix));
    }
    name.push(".");
    name.push(SIDECAR_EXTENSION);

    Some(SidecarPlan {
        source: sidecar,
        target: destination_dir.join(name),
        kind,
    })
}

/// Find an existing sidecar, preferring the appended form
fn find_sidecar(source: &Path) -> Option<(PathBuf, SidecarKind)> {
    let mut appended = OsString::from(source.as_os_str());
    appended.push(".");
    appended.push(SIDECAR_EXTENSION);
    let appended = PathBuf::from(appended);
    if appended.is_file() {
        return Some((appended, SidecarKind::Appended));
    }

    let replaced = source.with_extension(SIDECAR_EXTENSION);
    if replaced != source && replaced.is_file() {
        return Some((replaced, SidecarKind::Replaced));
    }

    None
}
