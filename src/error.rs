//! Error handling for Depthforge
//!
//! Every error carries a stable code and, where it makes sense, recovery
//! suggestions and the short message shown to the user.

use thiserror::Error;

/// Result type alias for Depthforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Main error type for Depthforge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // Intake Errors
    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file type: {name}")]
    UnsupportedFileType { name: String },

    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // Export Errors
    #[error("Unknown export format: {format}")]
    UnknownFormat { format: String },

    #[error("No generated model is available yet")]
    ModelNotReady,

    // Backend Errors
    #[error("Reconstruction backend error: {reason}")]
    BackendError { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForgeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ForgeError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ForgeError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            ForgeError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ForgeError::UnknownFormat { .. } => "UNKNOWN_FORMAT",
            ForgeError::ModelNotReady => "MODEL_NOT_READY",
            ForgeError::BackendError { .. } => "BACKEND_ERROR",
            ForgeError::InvalidConfig { .. } => "INVALID_CONFIG",
            ForgeError::Io(_) => "IO_ERROR",
            ForgeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Intake rejections never change session state, so the user can simply
    /// offer another file.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForgeError::FileTooLarge { .. }
                | ForgeError::UnsupportedFileType { .. }
                | ForgeError::FileNotFound { .. }
                | ForgeError::UnknownFormat { .. }
                | ForgeError::ModelNotReady
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ForgeError::FileTooLarge { .. } => vec![
                "Select a smaller image",
                "Downscale or recompress the image and try again",
            ],
            ForgeError::UnsupportedFileType { .. } => vec![
                "Supported formats: PNG, JPG, JPEG, GIF, BMP, WebP",
                "Convert the image to PNG or JPG first",
            ],
            ForgeError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            ForgeError::UnknownFormat { .. } => vec!["Available formats: glb, obj, usdz"],
            ForgeError::ModelNotReady => vec![
                "Upload an image and generate a model first",
                "Wait for the conversion to finish",
            ],
            ForgeError::InvalidConfig { .. } => vec![
                "Check the configuration file against the documented defaults",
                "Remove the offending field to fall back to its default",
            ],
            _ => vec![],
        }
    }

    /// Get the short user-facing message for this error
    pub fn friendly_message(&self) -> String {
        match self {
            ForgeError::FileTooLarge { max, .. } => format!(
                "File too large. Please select an image under {}.",
                ceiling_label(*max)
            ),
            ForgeError::UnsupportedFileType { .. } => {
                "Please select a valid image file (PNG, JPG, GIF, etc.)".to_string()
            }
            ForgeError::FileNotFound { path, .. } => {
                format!("I couldn't find the file at '{}'.", path)
            }
            ForgeError::ModelNotReady => {
                "There is no 3D model to download yet.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// "10MB", "1.5MB", "512KB" or "100 bytes"
fn ceiling_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    let (unit_bytes, unit) = match bytes {
        b if b >= MIB => (MIB, "MB"),
        b if b >= KIB => (KIB, "KB"),
        b => return format!("{} bytes", b),
    };
    if bytes % unit_bytes == 0 {
        format!("{}{}", bytes / unit_bytes, unit)
    } else {
        format!("{:.1}{}", bytes as f64 / unit_bytes as f64, unit)
    }
}
