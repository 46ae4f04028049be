//! Reconstruction backend trait and core types
//!
//! Defines the contract every image-to-3D collaborator must honour: submit an
//! image, get a model handle back, then ask for format-specific bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::intake::UploadedAsset;
use crate::viewer::ExportFormat;

/// Information about a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend identifier (e.g., "placeholder")
    pub id: String,

    /// Human-readable model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Description of what the backend does
    pub description: String,

    /// Quality label shown next to the progress panel
    pub quality: String,

    /// Formats `export` can produce
    pub supported_formats: Vec<ExportFormat>,
}

/// Mesh statistics shown under the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub vertices: u32,
    pub faces: u32,
    pub size_label: String,
}

impl ModelStats {
    /// Vertex count with thousands separators ("2,847")
    pub fn vertices_label(&self) -> String {
        group_thousands(self.vertices)
    }

    pub fn faces_label(&self) -> String {
        group_thousands(self.faces)
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Reference to a generated model held by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelHandle {
    pub id: Uuid,
    pub backend_id: String,
    pub source_name: String,
    /// SHA-256 of the submitted image
    pub source_checksum: String,
    pub stats: ModelStats,
    pub created_at: DateTime<Utc>,
}

/// Trait that all reconstruction backends must implement
pub trait ReconstructionBackend: Send + Sync {
    /// Get backend information
    fn info(&self) -> &BackendInfo;

    /// Submit an image for reconstruction
    ///
    /// # Arguments
    /// * `asset` - The validated upload
    ///
    /// # Returns
    /// A handle that can later be exported
    fn submit(&self, asset: &UploadedAsset) -> Result<ModelHandle>;

    /// Encode a generated model in the requested format
    fn export(&self, handle: &ModelHandle, format: ExportFormat) -> Result<Vec<u8>>;

    /// Check if the backend is ready to use
    fn is_available(&self) -> bool {
        true
    }

    /// Get backend ID (convenience method)
    fn id(&self) -> &str {
        &self.info().id
    }
}
