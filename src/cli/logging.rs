// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Terminal output for the `predict` command: verbosity, colored messages,
//! and the keypoint table printed after each image.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::results::{Keypoint, Pose, Speed};

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print a yellow warning to stderr.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Print a red error to stderr.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Print a line only when verbose output is enabled.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Print a cyan section header when verbose output is enabled.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

// ================================================================================================
// Pose report
// ================================================================================================

/// Summary like "12/17 keypoints, score 0.81", counting keypoints at or
/// above `min_score`.
#[must_use]
pub fn format_pose_summary(pose: &Pose, min_score: f32) -> String {
    let visible = pose.keypoints.iter().filter(|kp| kp.score >= min_score).count();
    format!("{visible}/{} keypoints, score {:.2}", pose.len(), pose.score)
}

/// One row of the keypoint table, in original image pixels.
#[must_use]
pub fn format_keypoint_row(kp: &Keypoint) -> String {
    format!(
        "  {:<14} x={:>8.1} y={:>8.1} score={:.3}",
        kp.name.as_str(),
        kp.position.x,
        kp.position.y,
        kp.score
    )
}

/// Per-stage timing line for one image of `shape` (height, width).
#[must_use]
pub fn format_speed(speed: &Speed, shape: (u32, u32)) -> String {
    format!(
        "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms postprocess per image at shape (1, {}, {}, 3)",
        speed.preprocess.unwrap_or(0.0),
        speed.inference.unwrap_or(0.0),
        speed.postprocess.unwrap_or(0.0),
        shape.0,
        shape.1
    )
}

/// Print the keypoint table. Rows below `min_score` are dimmed.
pub fn print_keypoint_table(pose: &Pose, min_score: f32) {
    if !is_verbose() {
        return;
    }
    crate::section!("Keypoints ({})", format_pose_summary(pose, min_score));
    for kp in &pose.keypoints {
        let row = format_keypoint_row(kp);
        if kp.score >= min_score {
            println!("{row}");
        } else {
            println!("{}", row.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::KeypointName;
    use crate::results::Position;

    fn two_point_pose() -> Pose {
        Pose::new(vec![
            Keypoint {
                name: KeypointName::Nose,
                position: Position::new(1.0, 2.0),
                score: 0.9,
            },
            Keypoint {
                name: KeypointName::LeftShoulder,
                position: Position::new(123.4, 67.8),
                score: 0.1,
            },
        ])
    }

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_format_pose_summary() {
        assert_eq!(format_pose_summary(&two_point_pose(), 0.3), "1/2 keypoints, score 0.50");
        assert_eq!(format_pose_summary(&two_point_pose(), 0.05), "2/2 keypoints, score 0.50");
        assert_eq!(format_pose_summary(&Pose::new(Vec::new()), 0.3), "0/0 keypoints, score 0.00");
    }

    #[test]
    fn test_format_keypoint_row() {
        let pose = two_point_pose();
        assert_eq!(
            format_keypoint_row(&pose.keypoints[0]),
            "  nose           x=     2.0 y=     1.0 score=0.900"
        );
        assert_eq!(
            format_keypoint_row(&pose.keypoints[1]),
            "  leftShoulder   x=    67.8 y=   123.4 score=0.100"
        );
    }

    #[test]
    fn test_format_speed() {
        let speed = Speed::new(1.5, 10.0, 0.3);
        assert_eq!(
            format_speed(&speed, (257, 257)),
            "Speed: 1.5ms preprocess, 10.0ms inference, 0.3ms postprocess per image at shape (1, 257, 257, 3)"
        );
        assert_eq!(
            format_speed(&Speed::default(), (192, 192)),
            "Speed: 0.0ms preprocess, 0.0ms inference, 0.0ms postprocess per image at shape (1, 192, 192, 3)"
        );
    }
}
