// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#[cfg(feature = "annotate")]
use std::fs;
#[cfg(feature = "annotate")]
use std::path::{Path, PathBuf};
use std::process;

#[cfg(feature = "annotate")]
use image::DynamicImage;

#[cfg(feature = "annotate")]
use crate::annotate::{annotate_pose, find_next_run_dir};
use crate::architecture::{InputResolution, OutputStride};
use crate::cli::args::PredictArgs;
use crate::cli::logging::{format_pose_summary, format_speed, print_keypoint_table, set_verbose};
use crate::error::Result;
#[cfg(feature = "annotate")]
use crate::results::Prediction;
use crate::{InferenceConfig, PoseNetModel, VERSION};
use crate::{error, verbose};
#[cfg(not(feature = "annotate"))]
use crate::warn;

/// Run single-pose estimation on one image.
pub fn run_prediction(args: &PredictArgs) {
    set_verbose(args.verbose);

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let mut model = match PoseNetModel::load(&args.model, args.architecture, config) {
        Ok(m) => m,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    println!("PoseNet {VERSION} 🚀 Rust ONNX {}", model.architecture());
    verbose!(
        "{} summary: {} keypoints, {} decoding, resolution={}, stride={}",
        model.architecture(),
        model.architecture().catalog().len(),
        model.architecture().decode_mode(),
        model.resolution(),
        model.stride()
    );

    let image = match image::open(&args.source) {
        Ok(img) => img,
        Err(e) => {
            error!("Failed to load image {}: {e}", args.source);
            process::exit(1);
        }
    };

    let prediction = match model.predict_image(&image) {
        Ok(p) => p,
        Err(e) => {
            error!("Inference failed: {e}");
            process::exit(1);
        }
    };

    verbose!(
        "image 1/1 {}: {}x{} {}, {:.1}ms",
        args.source,
        prediction.inference_shape.0,
        prediction.inference_shape.1,
        format_pose_summary(&prediction.pose, args.min_score),
        prediction.speed.inference.unwrap_or(0.0)
    );

    print_keypoint_table(&prediction.pose, args.min_score);
    verbose!("{}", format_speed(&prediction.speed, prediction.inference_shape));

    #[cfg(feature = "annotate")]
    if args.save {
        match save_annotated(&image, &prediction, args) {
            Ok(path) => verbose!("Results saved to {}", path.display()),
            Err(e) => error!("Failed to save result: {e}"),
        }
    }

    #[cfg(not(feature = "annotate"))]
    if args.save {
        warn!("--save requires the 'annotate' feature. Compile with --features annotate to enable saving.");
    }
}

/// Build the inference configuration from CLI arguments.
fn build_config(args: &PredictArgs) -> Result<InferenceConfig> {
    let mut config = InferenceConfig::new()
        .with_flip_horizontal(args.flip_horizontal)
        .with_threads(args.threads);

    if let Some(resolution) = args.resolution {
        config = config.with_input_resolution(InputResolution::new(resolution)?);
    }
    if let Some(stride) = args.stride {
        config = config.with_output_stride(OutputStride::try_from(stride)?);
    }

    Ok(config)
}

/// Draw the pose on the source image and write it under `runs/pose/predict*`.
#[cfg(feature = "annotate")]
fn save_annotated(image: &DynamicImage, prediction: &Prediction, args: &PredictArgs) -> Result<PathBuf> {
    let dir = find_next_run_dir(Path::new("runs/pose"), "predict");
    fs::create_dir_all(&dir)?;

    let file_name = Path::new(&args.source)
        .file_name()
        .map_or_else(|| "image.jpg".into(), std::ffi::OsStr::to_os_string);
    let path = dir.join(file_name);

    let annotated = annotate_pose(
        image,
        &prediction.pose,
        args.architecture.catalog(),
        args.min_score,
    );
    annotated.save(&path)?;
    Ok(path)
}
