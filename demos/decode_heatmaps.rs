// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example script decoding a synthetic CPM heatmap without a model file.
//!
//! This example covers:
//! 1. Implementing `PoseNetwork` for a custom backend.
//! 2. Running it on a letterboxed image and reading back keypoints in image pixels.

use image::{DynamicImage, RgbImage};
use ndarray::Array3;
use posenet_inference::cli::logging::format_keypoint_row;
use posenet_inference::{
    Architecture, DecodeMode, InferenceConfig, NetworkOutput, PoseNetModel, PoseNetwork, Result,
};

/// Places a Gaussian blob per keypoint along a vertical line.
struct SyntheticCpm;

impl PoseNetwork for SyntheticCpm {
    fn mode(&self) -> DecodeMode {
        DecodeMode::HeatmapOnly
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict(&mut self, _input: &Array3<f32>) -> Result<NetworkOutput> {
        let scores = Array3::from_shape_fn((96, 96, 14), |(row, col, k)| {
            let (cy, cx) = (10.0 + 5.0 * k as f32, 48.0);
            let d2 = (row as f32 - cy).powi(2) + (col as f32 - cx).powi(2);
            (-d2 / 8.0).exp()
        });
        Ok(NetworkOutput::Heatmap { scores })
    }
}

fn main() -> Result<()> {
    let mut model = PoseNetModel::new(SyntheticCpm, Architecture::Cpm, InferenceConfig::default())?;

    // A 640x480 frame letterboxes at scale 0.3 with 48 rows of bottom padding.
    let image = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
    let prediction = model.predict_image(&image)?;

    println!(
        "Decoded {} keypoints (score {:.2}) in {:.2}ms",
        prediction.pose.len(),
        prediction.pose.score,
        prediction.speed.total()
    );
    for kp in &prediction.pose.keypoints {
        println!("{}", format_keypoint_row(kp));
    }

    Ok(())
}
