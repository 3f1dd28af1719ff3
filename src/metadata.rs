//! Metadata extraction via exiftool
//!
//! The rest of the crate only sees a flat [`MetadataRecord`] of string keys
//! to string values. Where that record comes from is behind the
//! [`MetadataProvider`] trait so the pipeline can be driven without the
//! external binary.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Key carrying the MIME type in exiftool output
pub const MIME_TYPE_KEY: &str = "MIMEType";

/// Flat key/value metadata for a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: HashMap<String, String>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value; absent keys mean "not present"
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// MIME type reported for the file, if any
    pub fn mime_type(&self) -> Option<&str> {
        self.get(MIME_TYPE_KEY)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Build a record from one object of exiftool's `-j` output.
    ///
    /// Scalars are stringified; arrays and nested objects are dropped since
    /// none of the keys consumed here carry them.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = object
            .iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect();
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Source of per-file metadata
pub trait MetadataProvider {
    /// Extract metadata for one file.
    ///
    /// Callers treat an error exactly like an empty record.
    fn extract(&self, path: &Path) -> Result<MetadataRecord>;
}

/// Provider that shells out to the exiftool binary
#[derive(Debug)]
pub struct ExifToolProvider {
    program: String,
    available: OnceLock<bool>,
}

impl Default for ExifToolProvider {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExifToolProvider {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            available: OnceLock::new(),
        }
    }

    /// Check whether the binary can be executed (cached)
    pub fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| Command::new(&self.program).arg("-ver").output().is_ok())
    }

    /// Fail with [`Error::ExifToolNotFound`] when the binary is missing
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::ExifToolNotFound)
        }
    }
}

impl MetadataProvider for ExifToolProvider {
    fn extract(&self, path: &Path) -> Result<MetadataRecord> {
        if !self.is_available() {
            return Err(Error::ExifToolNotFound);
        }

        let output = Command::new(&self.program)
            .args(["-time:all", "-mimetype", "-j"])
            .arg(path)
            .output()
            .map_err(|e| Error::MetadataExtraction {
                path: path.to_path_buf(),
                message: format!("Failed to execute exiftool: {}", e),
            })?;

        if !output.status.success() {
            return Err(Error::MetadataExtraction {
                path: path.to_path_buf(),
                message: format!(
                    "exiftool failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let json_str = std::str::from_utf8(&output.stdout).map_err(|e| {
            Error::MetadataExtraction {
                path: path.to_path_buf(),
                message: format!("exiftool output is not UTF-8: {}", e),
            }
        })?;
        trace!(?path, "exiftool output: {}", json_str);

        let record = parse_exiftool_json(json_str).map_err(|message| Error::MetadataExtraction {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(?path, fields = record.len(), "Extracted metadata");
        Ok(record)
    }
}

/// Parse the JSON array printed by `exiftool -j` for a single file
fn parse_exiftool_json(json_str: &str) -> std::result::Result<MetadataRecord, String> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| format!("Failed to parse exiftool JSON: {}", e))?;

    json.as_array()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.as_object())
        .map(MetadataRecord::from_json_object)
        .ok_or_else(|| "exiftool returned no entries".to_string())
}
