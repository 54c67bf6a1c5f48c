// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing of network outputs.
//!
//! This module decodes network outputs into a pose and maps it from the
//! letterboxed network-input frame back to the original image.

use crate::architecture::{Architecture, OutputStride};
use crate::decode::decode_single_pose;
use crate::error::{PoseError, Result};
use crate::network::NetworkOutput;
use crate::preprocessing::{letterbox_scale, LetterboxPlan, Padding};
use crate::results::{Pose, Position};

/// Map a pose from the network-input frame to the original image frame.
///
/// Undoes the letterbox transform: subtracts the top/left padding, divides
/// by the letterbox scale, and if `flip_horizontal` is set mirrors `x` about
/// the original width (`x ← W - 1 - x`) as the last step. Scores pass through.
///
/// # Arguments
///
/// * `pose` - Pose in network-input coordinates.
/// * `orig_shape` - Original image shape (height, width).
/// * `input_shape` - Network input shape (height, width).
/// * `padding` - Padding recorded by the letterbox transform.
/// * `flip_horizontal` - Mirror the result horizontally.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if any dimension is zero.
#[allow(clippy::cast_precision_loss)]
pub fn scale_and_flip_pose(
    pose: &Pose,
    orig_shape: (u32, u32),
    input_shape: (u32, u32),
    padding: &Padding,
    flip_horizontal: bool,
) -> Result<Pose> {
    let (orig_h, orig_w) = orig_shape;
    let (input_h, input_w) = input_shape;
    if orig_h == 0 || orig_w == 0 || input_h == 0 || input_w == 0 {
        return Err(PoseError::InvalidInput(format!(
            "dimensions must be positive, got image {orig_h}x{orig_w} and input {input_h}x{input_w}"
        )));
    }

    let inv_scale = 1.0 / letterbox_scale(orig_shape, input_shape);
    let mirror = orig_w as f32 - 1.0;

    Ok(pose.map_positions(|p| {
        let y = (p.y - padding.top) * inv_scale;
        let x = (p.x - padding.left) * inv_scale;
        let x = if flip_horizontal { mirror - x } else { x };
        Position::new(y, x)
    }))
}

/// [`scale_and_flip_pose`] driven by a letterbox plan.
///
/// # Errors
///
/// Propagates errors from [`scale_and_flip_pose`].
pub fn scale_pose_with_plan(pose: &Pose, plan: &LetterboxPlan, flip_horizontal: bool) -> Result<Pose> {
    scale_and_flip_pose(
        pose,
        plan.orig_shape,
        plan.target_shape,
        &plan.padding,
        flip_horizontal,
    )
}

/// Decode network output and remap it to the original image.
///
/// # Arguments
///
/// * `output` - Dense network outputs.
/// * `architecture` - Network that produced them, fixing mode and catalog.
/// * `stride` - Output stride the network ran with.
/// * `plan` - Letterbox plan of the input image.
/// * `flip_horizontal` - Mirror the result horizontally.
///
/// # Errors
///
/// Returns [`PoseError::UnsupportedMode`] if the outputs do not match the
/// architecture's decode mode, [`PoseError::InvalidInput`] if the grid does
/// not match the input resolution and stride, or any error from decoding
/// and remapping.
pub fn postprocess(
    output: &NetworkOutput,
    architecture: Architecture,
    stride: OutputStride,
    plan: &LetterboxPlan,
    flip_horizontal: bool,
) -> Result<Pose> {
    output.expect_mode(architecture.decode_mode())?;

    let expected = expected_grid_shape(plan.target_shape, stride);
    if output.grid_shape() != expected {
        return Err(PoseError::InvalidInput(format!(
            "network grid {:?} does not match {expected:?} for input {:?} at stride {stride}",
            output.grid_shape(),
            plan.target_shape
        )));
    }

    let pose = decode_single_pose(
        output.scores(),
        output.offsets(),
        stride,
        architecture.catalog(),
    )?;

    scale_pose_with_plan(&pose, plan, flip_horizontal)
}

/// Grid size a network produces for `input_shape` at `stride`.
///
/// `(R - 1) / stride + 1` per axis, which also covers CPM's 192 / 2 = 96.
#[must_use]
pub fn expected_grid_shape(input_shape: (u32, u32), stride: OutputStride) -> (usize, usize) {
    let s = stride.as_u32();
    let cells = |side: u32| (side.saturating_sub(1) / s + 1) as usize;
    (cells(input_shape.0), cells(input_shape.1))
}
