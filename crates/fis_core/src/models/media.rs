//! Uploaded image descriptors.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// An image picked by the user, described by what the picker reports.
///
/// Only metadata is kept; the pixel data is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// File name as shown to the user.
    pub name: String,
    /// MIME type reported for the file (e.g. `image/png`).
    pub mime_type: String,
    /// Size on disk in bytes.
    pub size_bytes: u64,
}

impl ImageFile {
    /// Create a descriptor from known values.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Build a descriptor for a file on disk.
    ///
    /// The size comes from file metadata and the MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: mime_from_extension(path).to_string(),
            name,
            size_bytes: metadata.len(),
        })
    }
}

/// Guess a MIME type from a path's extension.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
