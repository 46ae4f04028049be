//! Conversion lifecycle state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the session is in the conversion lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionState {
    /// Waiting for an image (default state)
    #[default]
    Idle,
    /// An image is loaded and awaiting "generate"
    Uploading,
    /// A simulated run is in flight
    Converting,
    /// The placeholder model is ready
    Completed,
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionState::Idle => write!(f, "idle"),
            ConversionState::Uploading => write!(f, "uploading"),
            ConversionState::Converting => write!(f, "converting"),
            ConversionState::Completed => write!(f, "completed"),
        }
    }
}

/// Which panels are on screen
///
/// A pure function of `ConversionState`; nothing else influences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VisiblePanels {
    pub upload_zone: bool,
    pub preview: bool,
    pub generate_button: bool,
    pub progress: bool,
    pub viewer: bool,
    pub start_over_button: bool,
}

impl VisiblePanels {
    pub fn for_state(state: ConversionState) -> Self {
        let mut panels = Self::default();
        match state {
            ConversionState::Idle => panels.upload_zone = true,
            ConversionState::Uploading => {
                panels.preview = true;
                panels.generate_button = true;
            }
            ConversionState::Converting => panels.progress = true,
            ConversionState::Completed => {
                panels.viewer = true;
                panels.start_over_button = true;
            }
        }
        panels
    }
}
