// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end single-pose estimation.
//!
//! This module provides [`PoseNetModel`], which wires the letterbox transform,
//! a [`PoseNetwork`], the decoder, and the coordinate remapper together.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array3;

use crate::architecture::{Architecture, InputResolution, OutputStride};
use crate::error::{PoseError, Result};
use crate::inference::InferenceConfig;
use crate::network::PoseNetwork;
use crate::postprocessing::postprocess;
use crate::preprocessing::{preprocess_array, preprocess_image, PreprocessResult};
use crate::results::{Pose, Prediction, Speed};

#[cfg(feature = "onnx")]
use crate::onnx::OnnxPoseNetwork;

/// Pose model for single-person inference.
///
/// Holds a network together with the architecture it implements and the
/// resolved input resolution and output stride.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "onnx")]
/// # {
/// use posenet_inference::{Architecture, InferenceConfig, PoseNetModel};
///
/// let mut model = PoseNetModel::load("posenet.onnx", Architecture::ResNet50, InferenceConfig::default())?;
/// let prediction = model.predict("person.jpg")?;
/// println!("pose score {:.3}", prediction.pose.score);
/// # }
/// # Ok::<(), posenet_inference::PoseError>(())
/// ```
pub struct PoseNetModel<N> {
    network: N,
    architecture: Architecture,
    resolution: InputResolution,
    stride: OutputStride,
    config: InferenceConfig,
}

impl<N: PoseNetwork> PoseNetModel<N> {
    /// Wrap a network.
    ///
    /// Unset resolution and stride in `config` fall back to the
    /// architecture defaults.
    ///
    /// # Arguments
    ///
    /// * `network` - The pose network to drive.
    /// * `architecture` - Which network family it implements.
    /// * `config` - Inference configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::UnsupportedMode`] if the network's decode mode
    /// differs from the architecture's, or [`PoseError::InvalidResolution`]
    /// if the resolution and stride are incompatible.
    pub fn new(network: N, architecture: Architecture, config: InferenceConfig) -> Result<Self> {
        if network.mode() != architecture.decode_mode() {
            return Err(PoseError::UnsupportedMode(format!(
                "{architecture} decodes in {} mode but the network produces {} outputs",
                architecture.decode_mode(),
                network.mode()
            )));
        }

        let resolution = config
            .input_resolution
            .unwrap_or_else(|| architecture.default_resolution());
        let stride = config
            .output_stride
            .unwrap_or_else(|| architecture.default_stride());
        architecture.validate(resolution, stride)?;

        Ok(Self {
            network,
            architecture,
            resolution,
            stride,
            config,
        })
    }

    /// Run inference on an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be loaded or inference fails.
    pub fn predict<P: AsRef<Path>>(&mut self, path: P) -> Result<Prediction> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| {
            PoseError::ImageError(format!("Failed to load image {}: {e}", path.display()))
        })?;
        self.predict_image(&image)
    }

    /// Run inference on a `DynamicImage`.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, the network, or decoding fails.
    pub fn predict_image(&mut self, image: &DynamicImage) -> Result<Prediction> {
        let start = Instant::now();
        let preprocessed = preprocess_image(image, self.resolution)?;
        let preprocess_time = start.elapsed().as_secs_f64() * 1000.0;
        self.run(preprocessed, preprocess_time)
    }

    /// Run inference on a raw HWC `u8` RGB array.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, the network, or decoding fails.
    pub fn predict_array(&mut self, image: &Array3<u8>) -> Result<Prediction> {
        let start = Instant::now();
        let preprocessed = preprocess_array(image, self.resolution)?;
        let preprocess_time = start.elapsed().as_secs_f64() * 1000.0;
        self.run(preprocessed, preprocess_time)
    }

    /// Estimate the single pose in an image, in original-image pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, the network, or decoding fails.
    pub fn estimate_single_pose(&mut self, image: &DynamicImage) -> Result<Pose> {
        self.predict_image(image).map(|prediction| prediction.pose)
    }

    fn run(&mut self, preprocessed: PreprocessResult, preprocess_time: f64) -> Result<Prediction> {
        let start_inference = Instant::now();
        let output = self.network.predict(&preprocessed.tensor)?;
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let start_postprocess = Instant::now();
        let pose = postprocess(
            &output,
            self.architecture,
            self.stride,
            &preprocessed.plan,
            self.config.flip_horizontal,
        )?;
        let postprocess_time = start_postprocess.elapsed().as_secs_f64() * 1000.0;

        Ok(Prediction {
            pose,
            orig_shape: preprocessed.plan.orig_shape,
            inference_shape: preprocessed.plan.target_shape,
            speed: Speed::new(preprocess_time, inference_time, postprocess_time),
        })
    }

    /// Get the architecture.
    #[must_use]
    pub const fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Get the resolved input resolution.
    #[must_use]
    pub const fn resolution(&self) -> InputResolution {
        self.resolution
    }

    /// Get the resolved output stride.
    #[must_use]
    pub const fn stride(&self) -> OutputStride {
        self.stride
    }

    /// Get the inference configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Get the underlying network.
    #[must_use]
    pub const fn network(&self) -> &N {
        &self.network
    }
}

#[cfg(feature = "onnx")]
impl PoseNetModel<OnnxPoseNetwork> {
    /// Load a pose network from an ONNX file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `architecture` - Which network family the file contains.
    /// * `config` - Inference configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded,
    /// or if the configuration is invalid for the architecture.
    pub fn load<P: AsRef<Path>>(
        path: P,
        architecture: Architecture,
        config: InferenceConfig,
    ) -> Result<Self> {
        let network = OnnxPoseNetwork::load(path, architecture, config.num_threads)?;
        Self::new(network, architecture, config)
    }
}

impl<N> std::fmt::Debug for PoseNetModel<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseNetModel")
            .field("architecture", &self.architecture)
            .field("resolution", &self.resolution)
            .field("stride", &self.stride)
            .field("flip_horizontal", &self.config.flip_horizontal)
            .finish_non_exhaustive()
    }
}
