//! Media classification from the metadata MIME type

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// MIME types filed as images
static IMAGE_MIME: OnceLock<Regex> = OnceLock::new();

/// MIME types filed as videos
static VIDEO_MIME: OnceLock<Regex> = OnceLock::new();

fn image_mime() -> &'static Regex {
    IMAGE_MIME.get_or_init(|| {
        Regex::new(r"^(image/.+|application/vnd\.adobe\.photoshop)$").expect("valid image MIME regex")
    })
}

fn video_mime() -> &'static Regex {
    VIDEO_MIME.get_or_init(|| Regex::new(r"^video/.+$").expect("valid video MIME regex"))
}

/// Category a source file is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    /// Still images, including Photoshop documents
    Image,
    /// Video files
    Video,
    /// Anything without a recognised MIME type
    Unknown,
}

impl MediaCategory {
    /// Human readable name used in log lines and errors
    pub fn name(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a file by the MIME type reported in its metadata.
///
/// The file extension is never consulted. A missing MIME type (including a
/// failed metadata extraction) classifies as [`MediaCategory::Unknown`].
pub fn classify(mime_type: Option<&str>) -> MediaCategory {
    match mime_type {
        Some(mime) if image_mime().is_match(mime) => MediaCategory::Image,
        Some(mime) if video_mime().is_match(mime) => MediaCategory::Video,
        _ => MediaCategory::Unknown,
    }
}
