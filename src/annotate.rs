// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose visualization.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::keypoints::{KeypointCatalog, KeypointName};
use crate::results::{Keypoint, Pose};

/// Ultralytics Pose Color Palette
pub const POSE_COLORS: [[u8; 3]; 20] = [
    [255, 128, 0],   // #ff8000
    [255, 153, 51],  // #ff9933
    [255, 178, 102], // #ffb266
    [230, 230, 0],   // #e6e600
    [255, 153, 255], // #ff99ff
    [153, 204, 255], // #99ccff
    [255, 102, 255], // #ff66ff
    [255, 51, 255],  // #ff33ff
    [102, 178, 255], // #66b2ff
    [51, 153, 255],  // #3399ff
    [255, 153, 153], // #ff9999
    [255, 102, 102], // #ff6666
    [255, 51, 51],   // #ff3333
    [153, 255, 153], // #99ff99
    [102, 255, 102], // #66ff66
    [51, 255, 51],   // #33ff33
    [0, 255, 0],     // #00ff00
    [0, 0, 255],     // #0000ff
    [255, 0, 0],     // #ff0000
    [255, 255, 255], // #ffffff
];

/// Keypoints scoring below this are not drawn by default.
pub const DEFAULT_MIN_SCORE: f32 = 0.3;

/// Coarse body region, used to pick a palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyRegion {
    Head,
    Arm,
    Leg,
}

impl BodyRegion {
    const fn of(name: KeypointName) -> Self {
        match name {
            KeypointName::Nose
            | KeypointName::Neck
            | KeypointName::LeftEye
            | KeypointName::RightEye
            | KeypointName::LeftEar
            | KeypointName::RightEar => Self::Head,
            KeypointName::LeftShoulder
            | KeypointName::RightShoulder
            | KeypointName::LeftElbow
            | KeypointName::RightElbow
            | KeypointName::LeftWrist
            | KeypointName::RightWrist => Self::Arm,
            KeypointName::LeftHip
            | KeypointName::RightHip
            | KeypointName::LeftKnee
            | KeypointName::RightKnee
            | KeypointName::LeftAnkle
            | KeypointName::RightAnkle => Self::Leg,
        }
    }

    const fn color_index(self) -> usize {
        // face=green, arms=blue, legs=orange
        match self {
            Self::Head => 16,
            Self::Arm => 9,
            Self::Leg => 0,
        }
    }
}

/// Palette color for a keypoint.
#[must_use]
pub fn keypoint_color(name: KeypointName) -> Rgb<u8> {
    Rgb(POSE_COLORS[BodyRegion::of(name).color_index()])
}

/// Palette color for a limb: its region's color, or the torso color when
/// it joins two regions.
#[must_use]
pub fn limb_color(a: KeypointName, b: KeypointName) -> Rgb<u8> {
    let (ra, rb) = (BodyRegion::of(a), BodyRegion::of(b));
    if ra == rb {
        Rgb(POSE_COLORS[ra.color_index()])
    } else {
        Rgb(POSE_COLORS[7])
    }
}

/// Find the next available run directory (predict, predict2, predict3, etc.)
#[must_use]
pub fn find_next_run_dir(base: &Path, prefix: &str) -> PathBuf {
    let first = base.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base.join(format!("{prefix}{i}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Draw a pose's skeleton and keypoints on a copy of `image`.
///
/// Keypoints scoring below `min_score` and limbs touching them are skipped,
/// as are keypoints outside the image.
///
/// # Arguments
///
/// * `image` - The original image the pose was decoded from.
/// * `pose` - Pose in original-image pixels.
/// * `catalog` - Catalog whose skeleton edges are drawn.
/// * `min_score` - Minimum keypoint score to draw.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn annotate_pose(
    image: &DynamicImage,
    pose: &Pose,
    catalog: KeypointCatalog,
    min_score: f32,
) -> DynamicImage {
    let mut img = image.to_rgb8();
    let (width, height) = img.dimensions();

    // Scale strokes with the image so small and large inputs both read well.
    let short_side = width.min(height) as f32;
    let radius = (short_side / 150.0).round().max(2.0) as i32;
    let thickness = (short_side / 300.0).round().max(1.0) as i32;

    let visible = |kp: &Keypoint| {
        kp.score >= min_score
            && kp.position.x >= 0.0
            && kp.position.y >= 0.0
            && kp.position.x < width as f32
            && kp.position.y < height as f32
    };

    for &(a, b) in catalog.skeleton() {
        let (Some(ka), Some(kb)) = (pose.get(a), pose.get(b)) else {
            continue;
        };
        if !visible(ka) || !visible(kb) {
            continue;
        }
        draw_thick_line(
            &mut img,
            (ka.position.x, ka.position.y),
            (kb.position.x, kb.position.y),
            thickness,
            limb_color(a, b),
        );
    }

    for kp in pose.keypoints.iter().filter(|kp| visible(kp)) {
        let center = (kp.position.x.round() as i32, kp.position.y.round() as i32);
        draw_filled_circle_mut(&mut img, center, radius, keypoint_color(kp.name));
    }

    DynamicImage::ImageRgb8(img)
}

#[allow(clippy::cast_precision_loss)]
fn draw_thick_line(
    img: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: i32,
    color: Rgb<u8>,
) {
    let half = thickness / 2;
    for dy in -half..=half {
        for dx in -half..=half {
            let (ox, oy) = (dx as f32, dy as f32);
            draw_line_segment_mut(img, (start.0 + ox, start.1 + oy), (end.0 + ox, end.1 + oy), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Position;

    fn pose_at(points: &[(KeypointName, f32, f32, f32)]) -> Pose {
        Pose::new(
            points
                .iter()
                .map(|&(name, y, x, score)| Keypoint {
                    name,
                    position: Position::new(y, x),
                    score,
                })
                .collect(),
        )
    }

    #[test]
    fn test_colors_by_region() {
        assert_eq!(keypoint_color(KeypointName::Nose), Rgb(POSE_COLORS[16]));
        assert_eq!(keypoint_color(KeypointName::LeftWrist), Rgb(POSE_COLORS[9]));
        assert_eq!(keypoint_color(KeypointName::RightAnkle), Rgb(POSE_COLORS[0]));
        assert_eq!(
            limb_color(KeypointName::LeftHip, KeypointName::LeftShoulder),
            Rgb(POSE_COLORS[7])
        );
    }

    #[test]
    fn test_annotate_draws_confident_keypoints() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        let pose = pose_at(&[
            (KeypointName::Nose, 20.0, 30.0, 0.9),
            (KeypointName::Neck, 60.0, 70.0, 0.1),
        ]);

        let annotated = annotate_pose(&image, &pose, KeypointCatalog::Cpm, 0.5).to_rgb8();
        assert_eq!(annotated.dimensions(), (100, 100));
        assert_eq!(*annotated.get_pixel(30, 20), keypoint_color(KeypointName::Nose));
        assert_eq!(*annotated.get_pixel(70, 60), Rgb([0, 0, 0]));
        // The nose-neck limb is skipped because the neck is below threshold.
        assert_eq!(*annotated.get_pixel(50, 40), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_annotate_ignores_out_of_frame_keypoints() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(50, 50));
        let pose = pose_at(&[(KeypointName::Nose, -5.0, 200.0, 1.0)]);
        let annotated = annotate_pose(&image, &pose, KeypointCatalog::Cpm, 0.0).to_rgb8();
        assert!(annotated.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_find_next_run_dir() {
        let base = std::env::temp_dir().join(format!("posenet-runs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&base);

        assert_eq!(find_next_run_dir(&base, "predict"), base.join("predict"));
        std::fs::create_dir_all(base.join("predict")).unwrap();
        assert_eq!(find_next_run_dir(&base, "predict"), base.join("predict2"));

        let _ = std::fs::remove_dir_all(&base);
    }
}
