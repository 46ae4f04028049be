//! Candidate file validation
//!
//! A candidate is accepted when its extension is on the allow-list, any
//! declared MIME type is an `image/*` type, and its size does not exceed the
//! upload ceiling. The type check runs first.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ForgeConfig;
use crate::error::{ForgeError, Result};

/// Upload size ceiling: 10 MiB
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions accepted by default
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Image container recognised from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "gif" => Some(ImageKind::Gif),
            "bmp" => Some(ImageKind::Bmp),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Png => write!(f, "PNG"),
            ImageKind::Jpeg => write!(f, "JPEG"),
            ImageKind::Gif => write!(f, "GIF"),
            ImageKind::Bmp => write!(f, "BMP"),
            ImageKind::Webp => write!(f, "WebP"),
        }
    }
}

/// Where a candidate's bytes come from
#[derive(Debug, Clone)]
enum CandidateSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A file offered to intake, not yet validated
///
/// Candidates opened from disk only stat the file; the bytes are read after
/// validation passes, so an oversized file is rejected without loading it.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    mime_type: Option<String>,
    size: u64,
    source: CandidateSource,
}

impl CandidateFile {
    /// Candidate backed by in-memory bytes
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            size: bytes.len() as u64,
            source: CandidateSource::Memory(bytes),
        }
    }

    /// Candidate backed by a file on disk
    ///
    /// # Errors
    /// * `FileNotFound` - If the path does not exist
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| ForgeError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            mime_type: None,
            size: metadata.len(),
            source: CandidateSource::Disk(path.to_path_buf()),
        })
    }

    /// Attach the MIME type reported by the picker or drop event
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Override the reported size (e.g. when only metadata is known)
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Consume the candidate and return its content
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self.source {
            CandidateSource::Memory(bytes) => Ok(bytes),
            CandidateSource::Disk(path) => fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ForgeError::FileNotFound {
                        path: path.display().to_string(),
                        source: Some(e),
                    }
                } else {
                    ForgeError::Io(e)
                }
            }),
        }
    }
}

/// Type and size rules for intake
#[derive(Debug, Clone)]
pub struct IntakeValidator {
    max_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl Default for IntakeValidator {
    fn default() -> Self {
        Self::new(
            MAX_UPLOAD_BYTES,
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl IntakeValidator {
    pub fn new(max_bytes: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::new(config.max_upload_bytes, config.allowed_extensions.clone())
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate a candidate and resolve its image kind
    ///
    /// # Errors
    /// * `UnsupportedFileType` - Extension not allowed, or non-image MIME type
    /// * `FileTooLarge` - Size exceeds the ceiling
    pub fn validate(&self, candidate: &CandidateFile) -> Result<ImageKind> {
        let unsupported = || ForgeError::UnsupportedFileType {
            name: candidate.name().to_string(),
        };

        let ext = candidate.extension().ok_or_else(unsupported)?;
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(unsupported());
        }
        let kind = ImageKind::from_extension(&ext).ok_or_else(unsupported)?;

        if let Some(mime) = candidate.mime_type() {
            if !mime.to_ascii_lowercase().starts_with("image/") {
                return Err(unsupported());
            }
        }

        if candidate.size() > self.max_bytes {
            return Err(ForgeError::FileTooLarge {
                size: candidate.size(),
                max: self.max_bytes,
            });
        }

        Ok(kind)
    }
}
