//! Image preview panel
//!
//! Describes an accepted upload for display. Dimensions are decoded on a
//! best-effort basis; bytes that do not parse as an image simply have none.

use std::io::Cursor;

use image::ImageReader;
use log::debug;
use serde::Serialize;

use crate::intake::{DisplayUrl, ImageKind, UploadedAsset};

const READY_CAPTION: &str = "Ready for conversion";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePreview {
    pub name: String,
    pub kind: ImageKind,
    pub size_bytes: u64,
    pub display_url: DisplayUrl,
    pub dimensions: Option<(u32, u32)>,
}

impl ImagePreview {
    pub fn from_asset(asset: &UploadedAsset) -> Self {
        Self {
            name: asset.name().to_string(),
            kind: asset.kind(),
            size_bytes: asset.size(),
            display_url: asset.display_url().clone(),
            dimensions: decode_dimensions(asset.bytes()),
        }
    }

    /// Size in MiB with two decimals, e.g. "2.00 MB"
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }

    pub fn caption(&self) -> &'static str {
        READY_CAPTION
    }
}

fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            debug!("[PREVIEW] Could not read image dimensions: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{CandidateFile, FileIntake};
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decodes_dimensions() {
        let asset = FileIntake::default()
            .accept(CandidateFile::from_bytes("tile.png", png_bytes(4, 3)))
            .unwrap();
        let preview = ImagePreview::from_asset(&asset);
        assert_eq!(preview.dimensions, Some((4, 3)));
        assert_eq!(preview.caption(), "Ready for conversion");
    }

    #[test]
    fn test_undecodable_bytes_have_no_dimensions() {
        let asset = FileIntake::default()
            .accept(CandidateFile::from_bytes("photo.jpg", vec![0u8; 32]))
            .unwrap();
        assert_eq!(ImagePreview::from_asset(&asset).dimensions, None);
    }

    #[test]
    fn test_size_label() {
        let asset = FileIntake::default()
            .accept(
                CandidateFile::from_bytes("photo.jpg", Vec::new())
                    .with_declared_size(2 * 1024 * 1024),
            )
            .unwrap();
        assert_eq!(ImagePreview::from_asset(&asset).size_label(), "2.00 MB");
    }
}
