//! Placeholder backend
//!
//! Stands in for a real image-to-3D service. It performs no analysis: every
//! submission yields the same fixed stats, and every export is the same
//! stub payload regardless of format.

use chrono::Utc;
use uuid::Uuid;

use super::model::{BackendInfo, ModelHandle, ModelStats, ReconstructionBackend};
use crate::error::{ForgeError, Result};
use crate::intake::UploadedAsset;
use crate::viewer::ExportFormat;

/// Bytes written for every export
pub const PLACEHOLDER_PAYLOAD: &[u8] = b"Mock 3D model data";

pub struct PlaceholderBackend {
    info: BackendInfo,
}

impl PlaceholderBackend {
    pub fn new() -> Self {
        Self {
            info: BackendInfo {
                id: "placeholder".to_string(),
                name: "Shap-E".to_string(),
                version: "2.1".to_string(),
                description: "Fixed placeholder model; no inference is performed".to_string(),
                quality: "High-Res".to_string(),
                supported_formats: ExportFormat::ALL.to_vec(),
            },
        }
    }

    fn placeholder_stats() -> ModelStats {
        ModelStats {
            vertices: 2847,
            faces: 5694,
            size_label: "1.2 MB".to_string(),
        }
    }
}

impl Default for PlaceholderBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconstructionBackend for PlaceholderBackend {
    fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn submit(&self, asset: &UploadedAsset) -> Result<ModelHandle> {
        let handle = ModelHandle {
            id: Uuid::new_v4(),
            backend_id: self.info.id.clone(),
            source_name: asset.name().to_string(),
            source_checksum: asset.checksum().to_string(),
            stats: Self::placeholder_stats(),
            created_at: Utc::now(),
        };

        tracing::debug!(
            backend = %self.info.id,
            model = %handle.id,
            source = asset.name(),
            "accepted image for reconstruction"
        );
        Ok(handle)
    }

    fn export(&self, handle: &ModelHandle, format: ExportFormat) -> Result<Vec<u8>> {
        if handle.backend_id != self.info.id {
            return Err(ForgeError::BackendError {
                reason: format!(
                    "model {} belongs to backend '{}'",
                    handle.id, handle.backend_id
                ),
            });
        }

        tracing::debug!(model = %handle.id, %format, "exporting placeholder payload");
        Ok(PLACEHOLDER_PAYLOAD.to_vec())
    }
}
