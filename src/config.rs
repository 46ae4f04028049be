//! Runtime configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so an empty
//! object (or no file at all) yields the stock behaviour. The stage table is
//! compiled in and not configurable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::intake::{DEFAULT_ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES};
use crate::progress::AdvanceMode;

/// Default frame interval (~60 fps)
const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Largest accepted `time_scale`
pub const MAX_TIME_SCALE: f64 = 10_000.0;

/// Session and runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Upload size ceiling in bytes (inclusive)
    pub max_upload_bytes: u64,

    /// Accepted file extensions, lower-case, without the dot
    pub allowed_extensions: Vec<String>,

    /// When the next conversion stage becomes active
    pub advance_mode: AdvanceMode,

    /// Interval between frame-loop ticks in milliseconds
    pub frame_interval_ms: u64,

    /// Multiplier applied to wall-clock time (2.0 runs twice as fast)
    pub time_scale: f64,

    /// Directory where downloads are written
    pub output_dir: PathBuf,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            advance_mode: AdvanceMode::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            time_scale: 1.0,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ForgeConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }

        let content = fs::read_to_string(path)?;
        let config: ForgeConfig = serde_json::from_str(&content)?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(ForgeError::InvalidConfig {
                reason: format!("time_scale must be positive, got {}", self.time_scale),
            });
        }
        if self.time_scale > MAX_TIME_SCALE {
            return Err(ForgeError::InvalidConfig {
                reason: format!(
                    "time_scale must be at most {}, got {}",
                    MAX_TIME_SCALE, self.time_scale
                ),
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(ForgeError::InvalidConfig {
                reason: "frame_interval_ms must be at least 1".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ForgeError::InvalidConfig {
                reason: "max_upload_bytes must be at least 1".to_string(),
            });
        }
        if self.allowed_extensions.is_empty() {
            return Err(ForgeError::InvalidConfig {
                reason: "allowed_extensions must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
