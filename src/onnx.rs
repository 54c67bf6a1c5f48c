// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime backed pose network.
//!
//! The exported graphs take one NHWC `[1, R, R, 3]` float input and return
//! NHWC heatmap, offset, and (for multi-pose exports) displacement tensors.
//! Outputs are told apart by channel count: `K` channels is the score volume,
//! `2K` the offset volume. Anything else is ignored.

use std::path::Path;

use ndarray::{Array3, Axis};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use crate::architecture::{Architecture, DecodeMode};
use crate::decode::sigmoid;
use crate::error::{PoseError, Result};
use crate::network::{NetworkOutput, PoseNetwork};

/// A pose network running in an ONNX Runtime session.
pub struct OnnxPoseNetwork {
    session: Session,
    input_name: String,
    output_names: Vec<String>,
    num_keypoints: usize,
    mode: DecodeMode,
}

impl OnnxPoseNetwork {
    /// Load a network from an ONNX file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `architecture` - Network family, fixing keypoint count and mode.
    /// * `num_threads` - Intra-op threads, `0` lets ONNX Runtime decide.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::ModelLoadError`] if the file doesn't exist or
    /// can't be loaded.
    pub fn load<P: AsRef<Path>>(
        path: P,
        architecture: Architecture,
        num_threads: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PoseError::ModelLoadError("Model has no inputs".to_string()))?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        Ok(Self {
            session,
            input_name,
            output_names,
            num_keypoints: architecture.catalog().len(),
            mode: architecture.decode_mode(),
        })
    }
}

impl PoseNetwork for OnnxPoseNetwork {
    fn mode(&self) -> DecodeMode {
        self.mode
    }

    fn predict(&mut self, input: &Array3<f32>) -> Result<NetworkOutput> {
        let batched = input.view().insert_axis(Axis(0));
        let input_contiguous = batched.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| PoseError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![&self.input_name => input_tensor];
        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PoseError::InferenceError(format!("Inference failed: {e}")))?;

        let mut scores = None;
        let mut offsets = None;
        for name in &self.output_names {
            let Some(output) = outputs.get(name.as_str()) else {
                continue;
            };
            let (shape, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| PoseError::InferenceError(format!("Failed to extract output '{name}': {e}")))?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

            match classify_output(&dims, self.num_keypoints) {
                Some(VolumeKind::Scores) if scores.is_none() => {
                    scores = Some(to_volume(&dims, data)?);
                }
                Some(VolumeKind::Offsets) if offsets.is_none() => {
                    offsets = Some(to_volume(&dims, data)?);
                }
                _ => {}
            }
        }

        let mut scores = scores.ok_or_else(|| {
            PoseError::InferenceError(format!(
                "no output with {} channels to use as the score volume",
                self.num_keypoints
            ))
        })?;

        match self.mode {
            DecodeMode::HeatmapOnly => Ok(NetworkOutput::Heatmap { scores }),
            DecodeMode::HeatmapWithOffsets => {
                let offsets = offsets.ok_or_else(|| {
                    PoseError::InferenceError(format!(
                        "no output with {} channels to use as the offset volume",
                        2 * self.num_keypoints
                    ))
                })?;
                scores.mapv_inplace(sigmoid);
                Ok(NetworkOutput::HeatmapWithOffsets { scores, offsets })
            }
        }
    }
}

impl std::fmt::Debug for OnnxPoseNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPoseNetwork")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("num_keypoints", &self.num_keypoints)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolumeKind {
    Scores,
    Offsets,
}

/// Classify an NHWC output by its channel count.
///
/// Leading dims beyond the last three must all be 1.
fn classify_output(dims: &[usize], num_keypoints: usize) -> Option<VolumeKind> {
    if dims.len() < 3 || dims[..dims.len() - 3].iter().any(|&d| d != 1) {
        return None;
    }
    match dims[dims.len() - 1] {
        c if c == num_keypoints => Some(VolumeKind::Scores),
        c if c == 2 * num_keypoints => Some(VolumeKind::Offsets),
        _ => None,
    }
}

/// Copy a flat NHWC output into an `(H, W, C)` volume.
fn to_volume(dims: &[usize], data: &[f32]) -> Result<Array3<f32>> {
    let n = dims.len();
    let shape = (dims[n - 3], dims[n - 2], dims[n - 1]);
    Array3::from_shape_vec(shape, data.to_vec())
        .map_err(|e| PoseError::InferenceError(format!("Output shape {dims:?} does not match its data: {e}")))
}
