// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose decoding library.

use std::fmt;

/// Result type alias for pose decoding operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose decoding library.
///
/// None of these are transient: a failed decode call yields no partial pose
/// and should not be retried with the same input.
#[derive(Debug)]
pub enum PoseError {
    /// Malformed or mismatched array shapes, or non-positive dimensions.
    InvalidInput(String),
    /// Unsupported input resolution or output stride.
    InvalidResolution(String),
    /// Offset-capable decoding requested without an offset volume, or vice versa.
    UnsupportedMode(String),
    /// Error decoding or converting images.
    ImageError(String),
    /// Error loading the network model.
    ModelLoadError(String),
    /// Error during network inference.
    InferenceError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::InvalidResolution(msg) => write!(f, "Invalid resolution: {msg}"),
            Self::UnsupportedMode(msg) => write!(f, "Unsupported mode: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}
