// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for running pose estimation.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console logging, and the `predict` command implementation.

/// CLI arguments.
pub mod args;

/// Console messages and the keypoint report.
pub mod logging;

/// Prediction logic.
#[cfg(feature = "onnx")]
pub mod predict;
