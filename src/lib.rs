// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # PoseNet Inference Library
//!
//! Single-person pose estimation for PoseNet-family networks, written in Rust.
//! An image is letterboxed into the square network input, the network's dense
//! score (and optional offset) volumes are decoded into one keypoint per body
//! part, and the keypoints are mapped back to original-image pixels.
//!
//! ## Features
//!
//! - **Three architectures** - `ResNet50` and `MobileNetV1` with offset refinement,
//!   and the heatmap-only CPM network
//! - **Pluggable networks** - Anything implementing [`PoseNetwork`] drives the decoder
//! - **ONNX Runtime** - Optional [`OnnxPoseNetwork`] backend (feature `onnx`)
//! - **Annotation** - Skeleton and keypoint drawing (feature `annotate`)
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! # #[cfg(feature = "onnx")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use posenet_inference::{Architecture, InferenceConfig, PoseNetModel};
//!
//! let config = InferenceConfig::new().with_flip_horizontal(true);
//! let mut model = PoseNetModel::load("resnet50.onnx", Architecture::ResNet50, config)?;
//!
//! let prediction = model.predict("person.jpg")?;
//! for kp in &prediction.pose.keypoints {
//!     println!("{}: ({:.1}, {:.1}) {:.2}", kp.name, kp.position.x, kp.position.y, kp.score);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "onnx"))]
//! # fn main() {}
//! ```
//!
//! ## Decoding Without a Model
//!
//! ```rust
//! use ndarray::Array3;
//! use posenet_inference::{decode_single_pose, KeypointCatalog, OutputStride};
//!
//! let mut scores = Array3::<f32>::zeros((96, 96, 14));
//! scores[[10, 20, 0]] = 1.0;
//!
//! let pose = decode_single_pose(scores.view(), None, OutputStride::S2, KeypointCatalog::Cpm).unwrap();
//! assert_eq!(pose.keypoints[0].position.x, 40.0);
//! ```
//!
//! ## CLI
//!
//! ```bash
//! posenet-inference predict --model resnet50.onnx --source person.jpg --save
//! ```
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod architecture;
pub mod cli;
pub mod decode;
pub mod error;
pub mod inference;
pub mod keypoints;
pub mod model;
pub mod network;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod postprocessing;
pub mod preprocessing;
pub mod results;

// Re-export main types for convenience
pub use architecture::{Architecture, DecodeMode, InputResolution, OutputStride};
pub use decode::{argmax_2d, decode_single_pose, GridCell};
pub use error::{PoseError, Result};
pub use inference::InferenceConfig;
pub use keypoints::{KeypointCatalog, KeypointName};
pub use model::PoseNetModel;
pub use network::{NetworkOutput, PoseNetwork};
#[cfg(feature = "onnx")]
pub use onnx::OnnxPoseNetwork;
pub use postprocessing::{expected_grid_shape, postprocess, scale_and_flip_pose};
pub use results::{Keypoint, Pose, Position, Prediction, Speed};

// Re-export preprocessing utilities
pub use preprocessing::{calculate_letterbox_plan, preprocess_image, LetterboxPlan, Padding, PreprocessResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "posenet-inference");
    }
}
