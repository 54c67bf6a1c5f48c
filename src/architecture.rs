// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Network architectures and their supported geometry.
//!
//! This module defines the pose networks the decoder understands, the
//! decode mode each one implies, and the enumerated input resolutions and
//! output strides they may be run at.

use std::fmt;
use std::str::FromStr;

use crate::error::{PoseError, Result};
use crate::keypoints::KeypointCatalog;

/// Input resolutions accepted by the offset-capable networks.
pub const SUPPORTED_RESOLUTIONS: [u32; 13] = [
    161, 193, 257, 289, 321, 353, 385, 417, 449, 481, 513, 801, 1217,
];

/// Fixed square input size of the heatmap-only CPM network.
pub const CPM_RESOLUTION: u32 = 192;

/// How the decoder turns network output into keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeMode {
    /// Score volume only; keypoint scores are a fixed placeholder.
    HeatmapOnly,
    /// Score volume plus per-cell sub-pixel offsets.
    HeatmapWithOffsets,
}

impl DecodeMode {
    /// Returns whether this mode consumes an offset volume.
    #[must_use]
    pub const fn has_offsets(&self) -> bool {
        matches!(self, Self::HeatmapWithOffsets)
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeatmapOnly => f.write_str("heatmap"),
            Self::HeatmapWithOffsets => f.write_str("heatmap+offsets"),
        }
    }
}

/// Ratio of input pixels to one score grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStride {
    S32,
    S16,
    S8,
    S2,
}

impl OutputStride {
    /// Stride in pixels.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        match self {
            Self::S32 => 32,
            Self::S16 => 16,
            Self::S8 => 8,
            Self::S2 => 2,
        }
    }

    /// Stride in pixels as a float, for coordinate arithmetic.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f32(&self) -> f32 {
        self.as_u32() as f32
    }
}

impl TryFrom<u32> for OutputStride {
    type Error = PoseError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            32 => Ok(Self::S32),
            16 => Ok(Self::S16),
            8 => Ok(Self::S8),
            2 => Ok(Self::S2),
            _ => Err(PoseError::InvalidResolution(format!(
                "output stride {value} is not one of 32, 16, 8, 2"
            ))),
        }
    }
}

impl fmt::Display for OutputStride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Square network input resolution, validated against the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputResolution(u32);

impl InputResolution {
    /// The CPM network's fixed 192×192 input.
    pub const CPM: Self = Self(CPM_RESOLUTION);

    /// Validate a resolution.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidResolution`] if `value` is neither one of
    /// [`SUPPORTED_RESOLUTIONS`] nor [`CPM_RESOLUTION`].
    pub fn new(value: u32) -> Result<Self> {
        if value == CPM_RESOLUTION || SUPPORTED_RESOLUTIONS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(PoseError::InvalidResolution(format!(
                "input resolution {value} is not supported, expected one of {SUPPORTED_RESOLUTIONS:?}"
            )))
        }
    }

    /// Side length in pixels.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for InputResolution {
    type Error = PoseError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for InputResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pose network architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// ResNet50 backbone with heatmap and offset heads.
    ResNet50,
    /// MobileNetV1 backbone with heatmap and offset heads.
    MobileNetV1,
    /// Convolutional pose machine emitting heatmaps only.
    Cpm,
}

impl Architecture {
    /// Returns the name used on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResNet50 => "resnet50",
            Self::MobileNetV1 => "mobilenet",
            Self::Cpm => "cpm",
        }
    }

    /// Decode mode implied by the network's outputs.
    #[must_use]
    pub const fn decode_mode(&self) -> DecodeMode {
        match self {
            Self::ResNet50 | Self::MobileNetV1 => DecodeMode::HeatmapWithOffsets,
            Self::Cpm => DecodeMode::HeatmapOnly,
        }
    }

    /// Keypoint catalog fixing the network's channel order.
    #[must_use]
    pub const fn catalog(&self) -> KeypointCatalog {
        match self {
            Self::ResNet50 | Self::MobileNetV1 => KeypointCatalog::PoseNet,
            Self::Cpm => KeypointCatalog::Cpm,
        }
    }

    /// Stride used when the caller does not pick one.
    #[must_use]
    pub const fn default_stride(&self) -> OutputStride {
        match self {
            Self::ResNet50 => OutputStride::S32,
            Self::MobileNetV1 => OutputStride::S16,
            Self::Cpm => OutputStride::S2,
        }
    }

    /// Resolution used when the caller does not pick one.
    #[must_use]
    pub const fn default_resolution(&self) -> InputResolution {
        match self {
            Self::ResNet50 | Self::MobileNetV1 => InputResolution(257),
            Self::Cpm => InputResolution::CPM,
        }
    }

    /// Check that this network can run at `resolution` with `stride`.
    ///
    /// Offset-capable networks need `(resolution - 1)` to be a multiple of
    /// the stride and cannot run at the CPM size; the CPM network only runs
    /// at 192×192 with stride 2.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidResolution`] on an incompatible pair.
    pub fn validate(&self, resolution: InputResolution, stride: OutputStride) -> Result<()> {
        match self.decode_mode() {
            DecodeMode::HeatmapOnly => {
                if resolution != InputResolution::CPM || stride != OutputStride::S2 {
                    return Err(PoseError::InvalidResolution(format!(
                        "{self} runs at {CPM_RESOLUTION}x{CPM_RESOLUTION} with stride 2, got {resolution} with stride {stride}"
                    )));
                }
            }
            DecodeMode::HeatmapWithOffsets => {
                if resolution == InputResolution::CPM {
                    return Err(PoseError::InvalidResolution(format!(
                        "{self} does not support input resolution {resolution}"
                    )));
                }
                if (resolution.get() - 1) % stride.as_u32() != 0 {
                    return Err(PoseError::InvalidResolution(format!(
                        "input resolution {resolution} is not valid for output stride {stride}: (resolution - 1) must be divisible by the stride"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = ArchitectureParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resnet50" | "resnet" => Ok(Self::ResNet50),
            "mobilenet" | "mobilenetv1" | "mobilenet_v1" => Ok(Self::MobileNetV1),
            "cpm" => Ok(Self::Cpm),
            _ => Err(ArchitectureParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid architecture string.
#[derive(Debug, Clone)]
pub struct ArchitectureParseError(String);

impl fmt::Display for ArchitectureParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid architecture '{}', expected one of: resnet50, mobilenet, cpm",
            self.0
        )
    }
}

impl std::error::Error for ArchitectureParseError {}
