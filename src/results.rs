// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose estimation results.
//!
//! This module defines the value types produced by a decode call: keypoint
//! positions, per-keypoint scores, the assembled [`Pose`], and stage timings.

use ndarray::{Array1, Array2};

use crate::keypoints::KeypointName;

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on network inference.
    pub inference: Option<f64>,
    /// Time spent on decoding and remapping.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `inference` - Time in milliseconds.
    /// * `postprocess` - Time in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Sum of preprocess, inference, and postprocess times in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// A point in pixel coordinates of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub y: f32,
    pub x: f32,
}

impl Position {
    #[must_use]
    pub const fn new(y: f32, x: f32) -> Self {
        Self { y, x }
    }
}

/// A single decoded body landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Which landmark this is.
    pub name: KeypointName,
    /// Pixel position in the frame of the pipeline stage that produced it.
    pub position: Position,
    /// Confidence in `[0, 1]`.
    pub score: f32,
}

/// One person's keypoints, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// One entry per catalog part, in channel order.
    pub keypoints: Vec<Keypoint>,
    /// Aggregate pose confidence.
    pub score: f32,
}

impl Pose {
    /// Assemble a pose, scoring it by the mean keypoint score.
    ///
    /// An empty keypoint list scores `0.0`.
    #[must_use]
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        let score = mean_score(&keypoints);
        Self { keypoints, score }
    }

    /// Number of keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Check if the pose has no keypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Look up a keypoint by name.
    #[must_use]
    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// Keypoint coordinates as a `(K, 2)` array of `[x, y]` rows.
    #[must_use]
    pub fn xy(&self) -> Array2<f32> {
        let mut xy = Array2::zeros((self.keypoints.len(), 2));
        for (i, kp) in self.keypoints.iter().enumerate() {
            xy[[i, 0]] = kp.position.x;
            xy[[i, 1]] = kp.position.y;
        }
        xy
    }

    /// Keypoint scores as a `(K,)` array.
    #[must_use]
    pub fn conf(&self) -> Array1<f32> {
        self.keypoints.iter().map(|kp| kp.score).collect()
    }

    /// Return a copy with every position passed through `f`; scores unchanged.
    #[must_use]
    pub fn map_positions<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Position) -> Position,
    {
        Self {
            keypoints: self
                .keypoints
                .iter()
                .map(|kp| Keypoint {
                    position: f(kp.position),
                    ..*kp
                })
                .collect(),
            score: self.score,
        }
    }
}

/// Arithmetic mean of keypoint scores.
#[allow(clippy::cast_precision_loss)]
fn mean_score(keypoints: &[Keypoint]) -> f32 {
    if keypoints.is_empty() {
        return 0.0;
    }
    keypoints.iter().map(|kp| kp.score).sum::<f32>() / keypoints.len() as f32
}

/// Full output of one decode call.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Pose in the original image's pixel frame.
    pub pose: Pose,
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
    /// Network input shape (height, width).
    pub inference_shape: (u32, u32),
    /// Inference timing information.
    pub speed: Speed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(name: KeypointName, y: f32, x: f32, score: f32) -> Keypoint {
        Keypoint {
            name,
            position: Position::new(y, x),
            score,
        }
    }

    #[test]
    fn test_speed_total() {
        let speed = Speed::new(1.0, 2.0, 3.0);
        assert!((speed.total() - 6.0).abs() < 1e-9);
        assert!((Speed::default().total()).abs() < 1e-9);
    }

    #[test]
    fn test_pose_mean_score() {
        let pose = Pose::new(vec![
            kp(KeypointName::Nose, 0.0, 0.0, 0.2),
            kp(KeypointName::Neck, 0.0, 0.0, 0.6),
        ]);
        assert!((pose.score - 0.4).abs() < 1e-6);
        assert!(Pose::new(Vec::new()).score.abs() < f32::EPSILON);
    }

    #[test]
    fn test_pose_accessors() {
        let pose = Pose::new(vec![
            kp(KeypointName::Nose, 10.0, 20.0, 0.9),
            kp(KeypointName::Neck, 30.0, 40.0, 0.5),
        ]);

        assert_eq!(pose.len(), 2);
        assert!(!pose.is_empty());
        let neck = pose.get(KeypointName::Neck).unwrap();
        assert!((neck.position.x - 40.0).abs() < f32::EPSILON);
        assert!(pose.get(KeypointName::LeftAnkle).is_none());

        let xy = pose.xy();
        assert_eq!(xy.shape(), &[2, 2]);
        assert!((xy[[0, 0]] - 20.0).abs() < f32::EPSILON);
        assert!((xy[[0, 1]] - 10.0).abs() < f32::EPSILON);
        assert!((pose.conf()[1] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_map_positions_keeps_scores() {
        let pose = Pose::new(vec![kp(KeypointName::Nose, 1.0, 2.0, 0.3)]);
        let moved = pose.map_positions(|p| Position::new(p.y * 2.0, p.x + 1.0));
        assert!((moved.keypoints[0].position.y - 2.0).abs() < f32::EPSILON);
        assert!((moved.keypoints[0].position.x - 3.0).abs() < f32::EPSILON);
        assert!((moved.keypoints[0].score - 0.3).abs() < f32::EPSILON);
        assert!((moved.score - pose.score).abs() < f32::EPSILON);
    }
}
