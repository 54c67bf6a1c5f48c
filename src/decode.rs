// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Single-pose decoding of score and offset volumes.
//!
//! Volumes are HWC: `[grid_height, grid_width, channels]`, with channels in
//! keypoint catalog order. Offset volumes carry `2 * K` channels where channel
//! `k` is the y correction and channel `k + K` the x correction for keypoint `k`.

use ndarray::ArrayView3;

use crate::architecture::OutputStride;
use crate::error::{PoseError, Result};
use crate::keypoints::KeypointCatalog;
use crate::results::{Keypoint, Pose, Position};

/// Keypoint score reported when the network emits no offsets.
///
/// Heatmap-only networks give no calibrated confidence, so every keypoint
/// carries this value and the resulting pose scores `1.0`.
pub const HEATMAP_ONLY_SCORE: f32 = 1.0;

/// A cell of a score or offset volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Logistic squashing of a raw logit into `(0, 1)`.
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Find the highest-scoring cell of every channel.
///
/// Cells are scanned in row-major order and only a strictly greater score
/// replaces the current best, so ties resolve to the smallest `(row, col)`.
/// NaN scores never win.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if the grid is empty or the channel
/// count differs from `num_keypoints`.
pub fn argmax_2d(scores: ArrayView3<'_, f32>, num_keypoints: usize) -> Result<Vec<GridCell>> {
    let (height, width, channels) = scores.dim();
    if height == 0 || width == 0 {
        return Err(PoseError::InvalidInput(format!(
            "score volume has an empty grid ({height}x{width})"
        )));
    }
    if channels != num_keypoints {
        return Err(PoseError::InvalidInput(format!(
            "score volume has {channels} channels, expected {num_keypoints} keypoints"
        )));
    }

    let mut best = vec![(f32::NEG_INFINITY, GridCell::new(0, 0)); channels];
    for row in 0..height {
        for col in 0..width {
            for (c, slot) in best.iter_mut().enumerate() {
                let score = scores[[row, col, c]];
                if score > slot.0 {
                    *slot = (score, GridCell::new(row, col));
                }
            }
        }
    }

    Ok(best.into_iter().map(|(_, cell)| cell).collect())
}

/// Decode one pose in the network-input (resized) frame.
///
/// Each keypoint sits at `cell * stride`, refined by the offset volume when
/// one is given. With offsets, keypoint scores are read from the score volume
/// (already squashed to `[0, 1]`); without, they are [`HEATMAP_ONLY_SCORE`].
/// The pose score is the mean keypoint score.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if the volumes disagree with each
/// other or with the catalog.
#[allow(clippy::cast_precision_loss)]
pub fn decode_single_pose(
    scores: ArrayView3<'_, f32>,
    offsets: Option<ArrayView3<'_, f32>>,
    stride: OutputStride,
    catalog: KeypointCatalog,
) -> Result<Pose> {
    let num_keypoints = catalog.len();
    let cells = argmax_2d(scores, num_keypoints)?;

    if let Some(offsets) = offsets {
        let (height, width, _) = scores.dim();
        let expected = (height, width, 2 * num_keypoints);
        if offsets.dim() != expected {
            return Err(PoseError::InvalidInput(format!(
                "offset volume shape {:?} does not match expected {expected:?}",
                offsets.dim()
            )));
        }
    }

    let stride = stride.as_f32();
    let keypoints = catalog
        .parts()
        .iter()
        .zip(&cells)
        .enumerate()
        .map(|(c, (&name, cell))| {
            let mut y = cell.row as f32 * stride;
            let mut x = cell.col as f32 * stride;

            let score = match offsets {
                Some(offsets) => {
                    y += offsets[[cell.row, cell.col, c]];
                    x += offsets[[cell.row, cell.col, c + num_keypoints]];
                    scores[[cell.row, cell.col, c]]
                }
                None => HEATMAP_ONLY_SCORE,
            };

            Keypoint {
                name,
                position: Position::new(y, x),
                score,
            }
        })
        .collect();

    Ok(Pose::new(keypoints))
}
