//! Model Viewer
//!
//! Shown once a conversion completes:
//! - Placeholder scene with an orbit camera
//! - Fixed model stats
//! - Export of download artifacts through the backend

mod camera;
mod export;
mod scene;

pub use camera::OrbitCamera;
pub use export::{download_file_name, DownloadArtifact, ExportFormat, DOWNLOAD_MIME_TYPE};
pub use scene::{Material, Mesh, PlaceholderModel};

use std::time::Duration;

use log::info;

use crate::backend::{ModelHandle, ModelStats, ReconstructionBackend};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ModelViewer {
    model: PlaceholderModel,
    camera: OrbitCamera,
    handle: ModelHandle,
    source_stem: String,
    conversion_time_secs: u64,
}

impl ModelViewer {
    pub fn new(
        handle: ModelHandle,
        source_stem: impl Into<String>,
        conversion_time_secs: u64,
    ) -> Self {
        Self {
            model: PlaceholderModel::new(),
            camera: OrbitCamera::new(),
            handle,
            source_stem: source_stem.into(),
            conversion_time_secs,
        }
    }

    pub fn model(&self) -> &PlaceholderModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut PlaceholderModel {
        &mut self.model
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn stats(&self) -> &ModelStats {
        &self.handle.stats
    }

    pub fn source_name(&self) -> &str {
        &self.handle.source_name
    }

    pub fn conversion_time_secs(&self) -> u64 {
        self.conversion_time_secs
    }

    /// Advance scene animation by one frame
    pub fn advance_frame(&mut self, delta: Duration) {
        self.model.advance(delta);
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Build the download for `format`
    pub fn export(
        &self,
        format: ExportFormat,
        backend: &dyn ReconstructionBackend,
    ) -> Result<DownloadArtifact> {
        let bytes = backend.export(&self.handle, format)?;
        let artifact = DownloadArtifact::new(&self.source_stem, format, bytes);
        info!(
            "[VIEWER] Prepared {} ({} bytes)",
            artifact.file_name,
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}
