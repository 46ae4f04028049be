//! File Intake
//!
//! Accepts one candidate image at a time:
//! - Validates type and size
//! - Issues a display URL for the accepted file
//! - Ignores offers while a run is in flight

mod asset;
mod display_url;
mod validation;

pub use asset::UploadedAsset;
pub use display_url::{DisplayUrl, DisplayUrlRegistry};
pub use validation::{
    CandidateFile, ImageKind, IntakeValidator, DEFAULT_ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES,
};

use log::{debug, info};

use crate::config::ForgeConfig;
use crate::error::Result;

/// Validation plus display-URL bookkeeping
#[derive(Debug)]
pub struct FileIntake {
    validator: IntakeValidator,
    urls: DisplayUrlRegistry,
    enabled: bool,
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::new(IntakeValidator::default())
    }
}

impl FileIntake {
    pub fn new(validator: IntakeValidator) -> Self {
        Self {
            validator,
            urls: DisplayUrlRegistry::new(),
            enabled: true,
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::new(IntakeValidator::from_config(config))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!("[INTAKE] {}", if enabled { "Enabled" } else { "Disabled" });
        }
        self.enabled = enabled;
    }

    pub fn validator(&self) -> &IntakeValidator {
        &self.validator
    }

    pub fn urls(&self) -> &DisplayUrlRegistry {
        &self.urls
    }

    /// Validate a candidate and turn it into an asset
    ///
    /// Nothing is acquired when validation fails.
    pub fn accept(&mut self, candidate: CandidateFile) -> Result<UploadedAsset> {
        let kind = self.validator.validate(&candidate)?;

        let name = candidate.name().to_string();
        let size = candidate.size();
        let bytes = candidate.into_bytes()?;
        let display_url = self.urls.acquire();

        info!("[INTAKE] Accepted {} ({} bytes, {})", name, size, kind);
        Ok(UploadedAsset::new(name, size, kind, bytes, display_url))
    }

    /// Release the display URL held by an asset
    pub fn release(&mut self, asset: &UploadedAsset) -> bool {
        self.urls.release(asset.display_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_acquires_and_release_frees() {
        let mut intake = FileIntake::default();
        let asset = intake
            .accept(CandidateFile::from_bytes("photo.jpg", vec![0u8; 64]))
            .unwrap();

        assert_eq!(asset.kind(), ImageKind::Jpeg);
        assert_eq!(asset.size(), 64);
        assert!(intake.urls().is_live(asset.display_url()));

        assert!(intake.release(&asset));
        assert_eq!(intake.urls().live_count(), 0);
    }

    #[test]
    fn test_rejection_acquires_nothing() {
        let mut intake = FileIntake::default();
        let candidate =
            CandidateFile::from_bytes("big.png", Vec::new()).with_declared_size(12 * 1024 * 1024);

        assert!(intake.accept(candidate).is_err());
        assert_eq!(intake.urls().issued_count(), 0);
    }
}
