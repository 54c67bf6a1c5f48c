// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the pose estimation pipeline, driven by mock networks.

use image::{DynamicImage, RgbImage};
use ndarray::Array3;
use posenet_inference::{
    Architecture, DecodeMode, InferenceConfig, InputResolution, KeypointCatalog, KeypointName,
    NetworkOutput, OutputStride, Pose, PoseError, PoseNetModel, PoseNetwork,
};

/// Returns fixed outputs and records the input it was fed.
struct MockNetwork {
    output: NetworkOutput,
    last_input_shape: Option<(usize, usize, usize)>,
}

impl MockNetwork {
    fn new(output: NetworkOutput) -> Self {
        Self {
            output,
            last_input_shape: None,
        }
    }
}

impl PoseNetwork for MockNetwork {
    fn mode(&self) -> DecodeMode {
        self.output.mode()
    }

    fn predict(&mut self, input: &Array3<f32>) -> posenet_inference::Result<NetworkOutput> {
        self.last_input_shape = Some(input.dim());
        Ok(self.output.clone())
    }
}

/// CPM heatmap with the nose peak at grid cell (10, 20).
fn cpm_output() -> NetworkOutput {
    let mut scores = Array3::<f32>::zeros((96, 96, 14));
    scores[[10, 20, 0]] = 1.0;
    NetworkOutput::Heatmap { scores }
}

/// ResNet50 outputs at 257 / stride 32 (9x9 grid) with one confident keypoint.
fn resnet_output(row: usize, col: usize, channel: usize, dy: f32, dx: f32) -> NetworkOutput {
    let k = 17;
    let mut scores = Array3::<f32>::zeros((9, 9, k));
    let mut offsets = Array3::<f32>::zeros((9, 9, 2 * k));
    scores[[row, col, channel]] = 0.9;
    offsets[[row, col, channel]] = dy;
    offsets[[row, col, channel + k]] = dx;
    NetworkOutput::HeatmapWithOffsets { scores, offsets }
}

fn blank_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
}

fn keypoint_names(pose: &Pose) -> Vec<KeypointName> {
    pose.keypoints.iter().map(|kp| kp.name).collect()
}

#[test]
fn test_cpm_square_image() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(cpm_output()),
        Architecture::Cpm,
        InferenceConfig::default(),
    )
    .unwrap();

    let pose = model.estimate_single_pose(&blank_image(192, 192)).unwrap();
    assert_eq!(model.network().last_input_shape, Some((192, 192, 3)));
    assert_eq!(keypoint_names(&pose), KeypointCatalog::Cpm.parts());

    let nose = pose.get(KeypointName::Nose).unwrap();
    assert!((nose.position.y - 20.0).abs() < 1e-4);
    assert!((nose.position.x - 40.0).abs() < 1e-4);
    assert!(pose.keypoints.iter().all(|kp| (kp.score - 1.0).abs() < f32::EPSILON));
    assert!((pose.score - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_cpm_wide_image_is_unscaled() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(cpm_output()),
        Architecture::Cpm,
        InferenceConfig::default(),
    )
    .unwrap();

    // 100x200 letterboxes at scale 0.96; the peak at (20, 40) maps back by 1/0.96.
    let prediction = model.predict_image(&blank_image(200, 100)).unwrap();
    assert_eq!(prediction.orig_shape, (100, 200));
    assert_eq!(prediction.inference_shape, (192, 192));

    let nose = prediction.pose.get(KeypointName::Nose).unwrap();
    assert!((nose.position.y - 20.0 / 0.96).abs() < 1e-3);
    assert!((nose.position.x - 40.0 / 0.96).abs() < 1e-3);
}

#[test]
fn test_flip_horizontal_mirrors_result() {
    let config = InferenceConfig::new().with_flip_horizontal(true);
    let mut model =
        PoseNetModel::new(MockNetwork::new(cpm_output()), Architecture::Cpm, config).unwrap();

    let pose = model.estimate_single_pose(&blank_image(192, 192)).unwrap();
    let nose = pose.get(KeypointName::Nose).unwrap();
    assert!((nose.position.x - (191.0 - 40.0)).abs() < 1e-4);
    assert!((nose.position.y - 20.0).abs() < 1e-4);
}

#[test]
fn test_resnet_offsets_refine_position() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(resnet_output(4, 2, 0, 3.5, -1.25)),
        Architecture::ResNet50,
        InferenceConfig::default(),
    )
    .unwrap();
    assert_eq!(model.resolution().get(), 257);
    assert_eq!(model.stride(), OutputStride::S32);

    let pose = model.estimate_single_pose(&blank_image(257, 257)).unwrap();
    assert_eq!(keypoint_names(&pose), KeypointCatalog::PoseNet.parts());
    assert_eq!(keypoint_names(&pose), Architecture::ResNet50.catalog().parts());

    let nose = pose.get(KeypointName::Nose).unwrap();
    assert!((nose.position.y - (4.0 * 32.0 + 3.5)).abs() < 1e-3);
    assert!((nose.position.x - (2.0 * 32.0 - 1.25)).abs() < 1e-3);
    assert!((nose.score - 0.9).abs() < f32::EPSILON);
    assert!((pose.score - 0.9 / 17.0).abs() < 1e-6);
}

#[test]
fn test_resnet_scaling_on_large_image() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(resnet_output(8, 8, 16, 0.0, 0.0)),
        Architecture::ResNet50,
        InferenceConfig::default(),
    )
    .unwrap();

    // 514x514 halves onto the 257 input; (256, 256) maps back to (512, 512).
    let pose = model.estimate_single_pose(&blank_image(514, 514)).unwrap();
    let ankle = pose.get(KeypointName::RightAnkle).unwrap();
    assert!((ankle.position.y - 512.0).abs() < 1e-2);
    assert!((ankle.position.x - 512.0).abs() < 1e-2);
}

#[test]
fn test_custom_resolution_and_stride() {
    let config = InferenceConfig::new()
        .with_input_resolution(InputResolution::new(513).unwrap())
        .with_output_stride(OutputStride::S16);
    let k = 17;
    let output = NetworkOutput::HeatmapWithOffsets {
        scores: Array3::zeros((33, 33, k)),
        offsets: Array3::zeros((33, 33, 2 * k)),
    };

    let mut model =
        PoseNetModel::new(MockNetwork::new(output), Architecture::MobileNetV1, config).unwrap();
    model.estimate_single_pose(&blank_image(64, 48)).unwrap();
    assert_eq!(model.network().last_input_shape, Some((513, 513, 3)));
}

#[test]
fn test_incompatible_stride_is_rejected() {
    // CPM only runs with stride 2.
    let config = InferenceConfig::new().with_output_stride(OutputStride::S8);
    let result = PoseNetModel::new(MockNetwork::new(cpm_output()), Architecture::Cpm, config);
    assert!(matches!(result, Err(PoseError::InvalidResolution(_))));
}

#[test]
fn test_cpm_resolution_rejected_for_offset_networks() {
    let config = InferenceConfig::new().with_input_resolution(InputResolution::CPM);
    let result = PoseNetModel::new(
        MockNetwork::new(resnet_output(0, 0, 0, 0.0, 0.0)),
        Architecture::ResNet50,
        config,
    );
    assert!(matches!(result, Err(PoseError::InvalidResolution(_))));
}

#[test]
fn test_mode_mismatch_is_rejected() {
    let result = PoseNetModel::new(
        MockNetwork::new(cpm_output()),
        Architecture::MobileNetV1,
        InferenceConfig::default(),
    );
    assert!(matches!(result, Err(PoseError::UnsupportedMode(_))));
}

#[test]
fn test_empty_image_is_rejected() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(cpm_output()),
        Architecture::Cpm,
        InferenceConfig::default(),
    )
    .unwrap();
    let result = model.estimate_single_pose(&blank_image(0, 0));
    assert!(matches!(result, Err(PoseError::InvalidInput(_))));
    assert!(model.network().last_input_shape.is_none());
}

#[test]
fn test_pose_is_deterministic() {
    let mut model = PoseNetModel::new(
        MockNetwork::new(resnet_output(3, 5, 7, 0.5, 0.5)),
        Architecture::ResNet50,
        InferenceConfig::default(),
    )
    .unwrap();
    let image = blank_image(320, 240);
    let first = model.estimate_single_pose(&image).unwrap();
    let second = model.estimate_single_pose(&image).unwrap();
    assert_eq!(first, second);
}
