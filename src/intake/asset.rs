//! The accepted upload

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::display_url::DisplayUrl;
use super::validation::ImageKind;

/// Stem used when the uploaded name has nothing before its first dot
const FALLBACK_STEM: &str = "model";

/// An image that passed intake validation
///
/// Owned by the session. Its display URL stays live until the session
/// releases it on removal or restart.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    name: String,
    size: u64,
    kind: ImageKind,
    bytes: Vec<u8>,
    /// SHA-256 of the content, lower-case hex
    checksum: String,
    uploaded_at: DateTime<Utc>,
    display_url: DisplayUrl,
}

impl UploadedAsset {
    pub fn new(
        name: String,
        size: u64,
        kind: ImageKind,
        bytes: Vec<u8>,
        display_url: DisplayUrl,
    ) -> Self {
        let checksum = format!("{:x}", Sha256::digest(&bytes));
        Self {
            name,
            size,
            kind,
            bytes,
            checksum,
            uploaded_at: Utc::now(),
            display_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reported size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn display_url(&self) -> &DisplayUrl {
        &self.display_url
    }

    /// Name up to the first '.', used to name downloads
    ///
    /// `photo.final.jpg` yields `photo`; `.hidden.png` falls back to `model`.
    pub fn stem(&self) -> &str {
        match self.name.split('.').next() {
            Some(stem) if !stem.is_empty() => stem,
            _ => FALLBACK_STEM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::DisplayUrlRegistry;

    fn asset(name: &str, bytes: &[u8]) -> UploadedAsset {
        let mut registry = DisplayUrlRegistry::new();
        UploadedAsset::new(
            name.to_string(),
            bytes.len() as u64,
            ImageKind::Jpeg,
            bytes.to_vec(),
            registry.acquire(),
        )
    }

    #[test]
    fn test_stem() {
        assert_eq!(asset("photo.jpg", b"x").stem(), "photo");
        assert_eq!(asset("photo.final.jpg", b"x").stem(), "photo");
        assert_eq!(asset(".hidden.png", b"x").stem(), "model");
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let a = asset("a.jpg", b"abc");
        assert_eq!(
            a.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
