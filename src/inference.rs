// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! This module defines the [`InferenceConfig`] struct, which controls how an
//! image is fed to the network and how the decoded pose is reported: input
//! resolution, output stride, horizontal mirroring, and runtime threading.

use crate::architecture::{InputResolution, OutputStride};

/// Configuration for single-pose inference.
///
/// This struct is read-only for the duration of one decode call.
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use posenet_inference::{InferenceConfig, InputResolution, OutputStride};
///
/// let config = InferenceConfig::new()
///     .with_flip_horizontal(true)
///     .with_input_resolution(InputResolution::new(513).unwrap())
///     .with_output_stride(OutputStride::S16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InferenceConfig {
    /// Mirror the decoded pose horizontally in the original image frame.
    /// Useful for webcam feeds that are displayed mirrored.
    pub flip_horizontal: bool,
    /// Square network input side length.
    /// If `None`, the architecture's default resolution is used.
    pub input_resolution: Option<InputResolution>,
    /// Output stride of the network.
    /// If `None`, the architecture's default stride is used.
    pub output_stride: Option<OutputStride>,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable horizontal mirroring of the result.
    ///
    /// # Arguments
    ///
    /// * `flip` - `true` to report `x` as `width - 1 - x`.
    #[must_use]
    pub const fn with_flip_horizontal(mut self, flip: bool) -> Self {
        self.flip_horizontal = flip;
        self
    }

    /// Set the network input resolution.
    ///
    /// # Arguments
    ///
    /// * `resolution` - Side length of the square network input.
    #[must_use]
    pub const fn with_input_resolution(mut self, resolution: InputResolution) -> Self {
        self.input_resolution = Some(resolution);
        self
    }

    /// Set the output stride.
    ///
    /// # Arguments
    ///
    /// * `stride` - Input pixels per grid cell.
    #[must_use]
    pub const fn with_output_stride(mut self, stride: OutputStride) -> Self {
        self.output_stride = Some(stride);
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}
