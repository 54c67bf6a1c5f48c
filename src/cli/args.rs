// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::architecture::Architecture;

/// Default model path.
pub const DEFAULT_MODEL: &str = "posenet.onnx";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Predict Options:
    --model, -m <MODEL>         Path to ONNX model file [default: posenet.onnx]
    --source, -s <SOURCE>       Input image
    --architecture, -a <ARCH>   Network family: resnet50, mobilenet, cpm [default: resnet50]
    --resolution <RESOLUTION>   Square input side length (defaults per architecture)
    --stride <STRIDE>           Output stride: 32, 16, 8, 2 (defaults per architecture)
    --flip-horizontal           Mirror the decoded pose horizontally
    --threads <THREADS>         ONNX Runtime intra-op threads [default: 0 = auto]
    --save                      Save annotated image to runs/pose/predict
    --min-score <MIN_SCORE>     Minimum keypoint score to draw [default: 0.3]
    --verbose                   Show verbose output

Examples:
    posenet-inference predict --model resnet50.onnx --source person.jpg
    posenet-inference predict -m mobilenet.onnx -a mobilenet -s person.jpg --stride 8 --resolution 513
    posenet-inference predict -m cpm.onnx -a cpm -s person.jpg --save
    posenet-inference predict -m resnet50.onnx -s selfie.jpg --flip-horizontal"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the single pose in an image
    Predict(PredictArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct PredictArgs {
    /// Path to ONNX model file
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Input image
    #[arg(short, long)]
    pub source: String,

    /// Network family (resnet50, mobilenet, cpm)
    #[arg(short, long, default_value = "resnet50")]
    pub architecture: Architecture,

    /// Square input side length
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Output stride (32, 16, 8, 2)
    #[arg(long)]
    pub stride: Option<u32>,

    /// Mirror the decoded pose horizontally
    #[arg(long, default_value_t = false)]
    pub flip_horizontal: bool,

    /// ONNX Runtime intra-op threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Save annotated image to runs/pose/predict
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Minimum keypoint score to draw when saving
    #[arg(long, default_value_t = 0.3)]
    pub min_score: f32,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}
