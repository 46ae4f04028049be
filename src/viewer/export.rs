//! Export formats and download artifacts

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// MIME type of every download
pub const DOWNLOAD_MIME_TYPE: &str = "application/octet-stream";

/// Format requested by a download action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Glb,
    Obj,
    Usdz,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Glb, ExportFormat::Obj, ExportFormat::Usdz];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Glb => "glb",
            ExportFormat::Obj => "obj",
            ExportFormat::Usdz => "usdz",
        }
    }

    /// Upper-case label used on buttons and in toasts
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Glb => "GLB",
            ExportFormat::Obj => "OBJ",
            ExportFormat::Usdz => "USDZ",
        }
    }

    pub fn blurb(&self) -> &'static str {
        match self {
            ExportFormat::Glb => "Best for web",
            ExportFormat::Obj => "Universal format",
            ExportFormat::Usdz => "iOS AR ready",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "glb" => Ok(ExportFormat::Glb),
            "obj" => Ok(ExportFormat::Obj),
            "usdz" => Ok(ExportFormat::Usdz),
            _ => Err(ForgeError::UnknownFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// `{stem}.{ext}`
pub fn download_file_name(stem: &str, format: ExportFormat) -> String {
    format!("{}.{}", stem, format.extension())
}

/// A file ready to be handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn new(stem: &str, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: download_file_name(stem, format),
            format,
            mime_type: DOWNLOAD_MIME_TYPE,
            bytes,
        }
    }

    /// Write the artifact into `dir`, creating it if needed
    ///
    /// An existing file with the same name is overwritten.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(
            "[EXPORT] Saved {} ({} bytes) to {}",
            self.file_name,
            self.bytes.len(),
            path.display()
        );
        Ok(path)
    }
}
