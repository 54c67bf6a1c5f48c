// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Boundary to the pose network.
//!
//! The network itself is opaque: anything that maps a normalized HWC image to
//! a score volume, and optionally an offset volume, can drive the decoder.

use ndarray::{Array3, ArrayView3};

use crate::architecture::DecodeMode;
use crate::error::{PoseError, Result};

/// Dense outputs of one network call, tagged by decode mode.
#[derive(Debug, Clone)]
pub enum NetworkOutput {
    /// `[gh, gw, K]` scores only.
    Heatmap {
        scores: Array3<f32>,
    },
    /// `[gh, gw, K]` scores in `[0, 1]` plus `[gh, gw, 2K]` offsets in pixels.
    HeatmapWithOffsets {
        scores: Array3<f32>,
        offsets: Array3<f32>,
    },
}

impl NetworkOutput {
    /// Decode mode these outputs support.
    #[must_use]
    pub const fn mode(&self) -> DecodeMode {
        match self {
            Self::Heatmap { .. } => DecodeMode::HeatmapOnly,
            Self::HeatmapWithOffsets { .. } => DecodeMode::HeatmapWithOffsets,
        }
    }

    /// The score volume.
    #[must_use]
    pub fn scores(&self) -> ArrayView3<'_, f32> {
        match self {
            Self::Heatmap { scores } | Self::HeatmapWithOffsets { scores, .. } => scores.view(),
        }
    }

    /// The offset volume, if present.
    #[must_use]
    pub fn offsets(&self) -> Option<ArrayView3<'_, f32>> {
        match self {
            Self::Heatmap { .. } => None,
            Self::HeatmapWithOffsets { offsets, .. } => Some(offsets.view()),
        }
    }

    /// Grid dimensions (height, width) of the score volume.
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize) {
        let (h, w, _) = self.scores().dim();
        (h, w)
    }

    /// Check these outputs against the mode the caller decodes in.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::UnsupportedMode`] when offsets are expected but
    /// missing, or present but not expected.
    pub fn expect_mode(&self, mode: DecodeMode) -> Result<()> {
        if self.mode() == mode {
            return Ok(());
        }
        let msg = if mode.has_offsets() {
            "offset-capable decoding requested but the network returned no offset volume"
        } else {
            "heatmap-only decoding requested but the network returned an offset volume"
        };
        Err(PoseError::UnsupportedMode(msg.to_string()))
    }
}

/// A pose network.
///
/// Implementors receive the normalized `(R, R, 3)` tensor produced by
/// [`crate::preprocessing::preprocess_image`] and return dense outputs.
pub trait PoseNetwork {
    /// Decode mode of the outputs this network returns.
    fn mode(&self) -> DecodeMode;

    /// Run the network on one normalized image.
    ///
    /// # Errors
    ///
    /// Implementation specific; typically [`PoseError::InferenceError`].
    fn predict(&mut self, input: &Array3<f32>) -> Result<NetworkOutput>;
}

impl<N: PoseNetwork + ?Sized> PoseNetwork for Box<N> {
    fn mode(&self) -> DecodeMode {
        (**self).mode()
    }

    fn predict(&mut self, input: &Array3<f32>) -> Result<NetworkOutput> {
        (**self).predict(input)
    }
}
