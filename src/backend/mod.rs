//! Reconstruction backends
//!
//! The image-to-3D step is an external collaborator reached through
//! `ReconstructionBackend`. Only the placeholder implementation ships.

mod model;
mod placeholder;

pub use model::{BackendInfo, ModelHandle, ModelStats, ReconstructionBackend};
pub use placeholder::{PlaceholderBackend, PLACEHOLDER_PAYLOAD};
