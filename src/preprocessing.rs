// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for pose network inference.
//!
//! This module computes the letterbox plan that fits an arbitrary image into
//! the square network input while preserving aspect ratio, applies it, and
//! normalizes the result with the network's channel mean.
//!
//! Padding is always placed on the bottom and right edges, so resized content
//! starts at the top-left corner of the canvas. The coordinate remapper in
//! [`crate::postprocessing`] inverts exactly this placement.

use std::borrow::Cow;

use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GenericImageView};
use ndarray::{s, Array3, ArrayView3, Axis};

use crate::architecture::InputResolution;
use crate::error::{PoseError, Result};

// ================================================================================================
// Constants
// ================================================================================================

/// Per-channel offsets added to raw 0-255 RGB values before inference.
pub const IMAGE_NET_MEAN: [f32; 3] = [-123.15, -115.9, -103.06];

/// Value written into padded pixels, before normalization.
const PAD_VALUE: u8 = 0;

// ================================================================================================
// Types
// ================================================================================================

/// Pixels added around the resized content, in network-input units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Resize and pad plan for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxPlan {
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Network input dimensions (height, width).
    pub target_shape: (u32, u32),
    /// Uniform scale factor applied to both axes.
    pub scale: f32,
    /// Dimensions of the resized content before padding (height, width).
    pub resized_shape: (u32, u32),
    /// Padding that completes the canvas.
    pub padding: Padding,
}

/// Letterboxed image in HWC layout with raw 0-255 float values.
#[derive(Debug, Clone)]
pub struct Letterboxed {
    /// `(R, R, 3)` canvas, zero where padded.
    pub image: Array3<f32>,
    /// The plan that produced it.
    pub plan: LetterboxPlan,
}

/// Result of preprocessing an image, containing the network input and transform info.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Normalized `(R, R, 3)` network input.
    pub tensor: Array3<f32>,
    /// Letterbox plan needed to map keypoints back.
    pub plan: LetterboxPlan,
}

// ================================================================================================
// Letterbox
// ================================================================================================

/// Uniform scale that fits `orig_shape` inside `target_shape`.
///
/// For a square target of side `R` this is `R / max(H, W)`. Both the
/// letterbox transform and the coordinate remapper go through this function.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn letterbox_scale(orig_shape: (u32, u32), target_shape: (u32, u32)) -> f32 {
    let (orig_h, orig_w) = (orig_shape.0 as f32, orig_shape.1 as f32);
    let (target_h, target_w) = (target_shape.0 as f32, target_shape.1 as f32);
    (target_h / orig_h).min(target_w / orig_w)
}

/// Calculate the letterbox plan for an image of `orig_height × orig_width`.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if the image has zero area.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn calculate_letterbox_plan(
    orig_height: u32,
    orig_width: u32,
    resolution: InputResolution,
) -> Result<LetterboxPlan> {
    if orig_height == 0 || orig_width == 0 {
        return Err(PoseError::InvalidInput(format!(
            "image has zero area ({orig_height}x{orig_width})"
        )));
    }

    let side = resolution.get();
    let orig_shape = (orig_height, orig_width);
    let target_shape = (side, side);
    let scale = letterbox_scale(orig_shape, target_shape);

    // A degenerate sliver still keeps one row/column of content.
    let new_h = ((orig_height as f32 * scale).round() as u32).clamp(1, side);
    let new_w = ((orig_width as f32 * scale).round() as u32).clamp(1, side);

    Ok(LetterboxPlan {
        orig_shape,
        target_shape,
        scale,
        resized_shape: (new_h, new_w),
        padding: Padding {
            top: 0.0,
            left: 0.0,
            bottom: (side - new_h) as f32,
            right: (side - new_w) as f32,
        },
    })
}

/// Letterbox a `DynamicImage` into the square network input.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] for zero-area images, or
/// [`PoseError::ImageError`] if resizing fails.
pub fn letterbox_image(image: &DynamicImage, resolution: InputResolution) -> Result<Letterboxed> {
    let (width, height) = image.dimensions();
    let plan = calculate_letterbox_plan(height, width, resolution)?;

    // RGB8 images are resized straight from their own buffer.
    let converted;
    let raw: &[u8] = match image {
        DynamicImage::ImageRgb8(rgb) => rgb.as_raw(),
        _ => {
            converted = image.to_rgb8();
            converted.as_raw()
        }
    };

    let resized = resize_rgb(raw, &plan)?;
    Ok(Letterboxed {
        image: to_float(&pad_to_canvas(&resized, &plan)?),
        plan,
    })
}

/// Letterbox a raw HWC `u8` RGB array into the square network input.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] for zero-area images or a channel
/// count other than 3, or [`PoseError::ImageError`] if resizing fails.
#[allow(clippy::cast_possible_truncation)]
pub fn letterbox_array(image: &Array3<u8>, resolution: InputResolution) -> Result<Letterboxed> {
    let (height, width, channels) = image.dim();
    if channels != 3 {
        return Err(PoseError::InvalidInput(format!(
            "expected 3 channels (RGB), got {channels}"
        )));
    }
    let plan = calculate_letterbox_plan(height as u32, width as u32, resolution)?;

    let contiguous = image.as_standard_layout();
    let raw = contiguous.as_slice().ok_or_else(|| {
        PoseError::InvalidInput("image array is not contiguous in memory".to_string())
    })?;

    let resized = resize_rgb(raw, &plan)?;
    Ok(Letterboxed {
        image: to_float(&pad_to_canvas(&resized, &plan)?),
        plan,
    })
}

/// Bilinear resize of packed RGB8 bytes to the plan's content size.
///
/// Borrows the source when no resize is needed.
fn resize_rgb<'a>(src: &'a [u8], plan: &LetterboxPlan) -> Result<Cow<'a, [u8]>> {
    let (src_h, src_w) = plan.orig_shape;
    let (dst_h, dst_w) = plan.resized_shape;

    if (src_h, src_w) == (dst_h, dst_w) {
        return Ok(Cow::Borrowed(src));
    }

    let src_image = ImageRef::new(src_w, src_h, src, PixelType::U8x3)
        .map_err(|e| PoseError::ImageError(format!("Failed to create source image: {e}")))?;
    let mut dst_image = Image::new(dst_w, dst_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| PoseError::ImageError(format!("Failed to resize image: {e}")))?;

    Ok(Cow::Owned(dst_image.into_vec()))
}

/// Copy resized content into the top-left of a zeroed `(R, R, 3)` canvas.
fn pad_to_canvas(resized: &[u8], plan: &LetterboxPlan) -> Result<Array3<u8>> {
    let (dst_h, dst_w) = (plan.target_shape.0 as usize, plan.target_shape.1 as usize);
    let (new_h, new_w) = (plan.resized_shape.0 as usize, plan.resized_shape.1 as usize);

    let content = ArrayView3::from_shape((new_h, new_w, 3), resized)
        .map_err(|e| PoseError::ImageError(format!("Resized buffer does not match plan: {e}")))?;

    let mut canvas = Array3::from_elem((dst_h, dst_w, 3), PAD_VALUE);
    canvas.slice_mut(s![..new_h, ..new_w, ..]).assign(&content);
    Ok(canvas)
}

// ================================================================================================
// Normalization
// ================================================================================================

/// Convert an integer HWC array to floating point, unchanged in value.
#[must_use]
pub fn to_float(image: &Array3<u8>) -> Array3<f32> {
    image.mapv(f32::from)
}

/// Add [`IMAGE_NET_MEAN`] to every pixel of an HWC RGB tensor.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if the tensor does not have 3 channels.
pub fn normalize_input(image: &Array3<f32>) -> Result<Array3<f32>> {
    let channels = image.len_of(Axis(2));
    if channels != IMAGE_NET_MEAN.len() {
        return Err(PoseError::InvalidInput(format!(
            "expected 3 channels (RGB), got {channels}"
        )));
    }

    let mut out = image.to_owned();
    for (c, mut plane) in out.axis_iter_mut(Axis(2)).enumerate() {
        let mean = IMAGE_NET_MEAN[c];
        plane.mapv_inplace(|v| v + mean);
    }
    Ok(out)
}

/// Letterbox and normalize an image for the network.
///
/// # Errors
///
/// Propagates errors from [`letterbox_image`].
pub fn preprocess_image(
    image: &DynamicImage,
    resolution: InputResolution,
) -> Result<PreprocessResult> {
    let letterboxed = letterbox_image(image, resolution)?;
    Ok(PreprocessResult {
        tensor: normalize_input(&letterboxed.image)?,
        plan: letterboxed.plan,
    })
}

/// Letterbox and normalize a raw HWC `u8` array for the network.
///
/// # Errors
///
/// Propagates errors from [`letterbox_array`].
pub fn preprocess_array(
    image: &Array3<u8>,
    resolution: InputResolution,
) -> Result<PreprocessResult> {
    let letterboxed = letterbox_array(image, resolution)?;
    Ok(PreprocessResult {
        tensor: normalize_input(&letterboxed.image)?,
        plan: letterboxed.plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn res(r: u32) -> InputResolution {
        InputResolution::new(r).unwrap()
    }

    #[test]
    fn test_letterbox_plan_square() {
        let plan = calculate_letterbox_plan(192, 192, InputResolution::CPM).unwrap();
        assert!((plan.scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(plan.resized_shape, (192, 192));
        assert_eq!(plan.padding, Padding::default());
    }

    #[test]
    fn test_letterbox_plan_wide() {
        let plan = calculate_letterbox_plan(100, 200, InputResolution::CPM).unwrap();
        assert!((plan.scale - 0.96).abs() < 1e-6);
        assert_eq!(plan.resized_shape, (96, 192));
        assert!(plan.padding.top.abs() < f32::EPSILON);
        assert!(plan.padding.left.abs() < f32::EPSILON);
        assert!((plan.padding.bottom - 96.0).abs() < f32::EPSILON);
        assert!(plan.padding.right.abs() < f32::EPSILON);
    }

    #[test]
    fn test_letterbox_plan_tall() {
        let plan = calculate_letterbox_plan(514, 257, res(257)).unwrap();
        assert!((plan.scale - 0.5).abs() < 1e-6);
        assert_eq!(plan.resized_shape, (257, 129));
        assert!((plan.padding.right - 128.0).abs() < f32::EPSILON);
        assert!(plan.padding.bottom.abs() < f32::EPSILON);
    }

    #[test]
    fn test_letterbox_plan_zero_area() {
        assert!(matches!(
            calculate_letterbox_plan(0, 10, res(257)),
            Err(PoseError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_letterbox_plan(10, 0, res(257)),
            Err(PoseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_letterbox_image_pads_bottom_with_zeros() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, image::Rgb([10, 20, 30])));
        let boxed = letterbox_image(&img, InputResolution::CPM).unwrap();

        assert_eq!(boxed.image.dim(), (192, 192, 3));
        // Content region keeps the flat color.
        assert!((boxed.image[[0, 0, 0]] - 10.0).abs() < 1.0);
        assert!((boxed.image[[95, 191, 2]] - 30.0).abs() < 1.0);
        // Padded rows are zero.
        assert!(boxed.image[[96, 0, 0]].abs() < f32::EPSILON);
        assert!(boxed.image[[191, 191, 1]].abs() < f32::EPSILON);
    }

    #[test]
    #[allow(clippy::cast_possible_truncation)]
    fn test_letterbox_without_resize_keeps_exact_values() {
        let pixels = Array3::from_shape_fn((192, 192, 3), |(y, x, c)| ((y * 3 + x + c * 50) % 256) as u8);
        let expected = to_float(&pixels);

        let from_array = letterbox_array(&pixels, InputResolution::CPM).unwrap();
        assert_eq!(from_array.image, expected);

        let rgb = RgbImage::from_fn(192, 192, |x, y| {
            let (x, y) = (x as usize, y as usize);
            image::Rgb([pixels[[y, x, 0]], pixels[[y, x, 1]], pixels[[y, x, 2]]])
        });
        let from_image = letterbox_image(&DynamicImage::ImageRgb8(rgb), InputResolution::CPM).unwrap();
        assert_eq!(from_image.image, expected);
    }

    #[test]
    fn test_letterbox_image_converts_other_color_types() {
        let rgb = RgbImage::from_pixel(64, 48, image::Rgb([90, 60, 30]));
        let rgba = DynamicImage::ImageRgb8(rgb.clone()).to_rgba8();

        let a = letterbox_image(&DynamicImage::ImageRgb8(rgb), res(257)).unwrap();
        let b = letterbox_image(&DynamicImage::ImageRgba8(rgba), res(257)).unwrap();
        assert_eq!(a.plan, b.plan);
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn test_letterbox_array_accepts_permuted_layout() {
        // Stored as (C, W, H), viewed as (H, W, C).
        let stored = Array3::from_shape_fn((3, 40, 30), |(c, x, y)| (c * 60 + x + y) as u8);
        let permuted = stored.permuted_axes([2, 1, 0]);
        let standard = permuted.as_standard_layout().to_owned();

        let a = letterbox_array(&permuted, InputResolution::CPM).unwrap();
        let b = letterbox_array(&standard, InputResolution::CPM).unwrap();
        assert_eq!(a.image, b.image);
        assert_eq!(a.plan.resized_shape, (144, 192));
    }

    #[test]
    fn test_letterbox_array_rejects_non_rgb() {
        let gray = Array3::<u8>::zeros((8, 8, 1));
        assert!(matches!(
            letterbox_array(&gray, InputResolution::CPM),
            Err(PoseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_normalize_input() {
        let mut img = Array3::<f32>::zeros((1, 1, 3));
        img[[0, 0, 0]] = 255.0;
        img[[0, 0, 1]] = 115.9;
        let out = normalize_input(&img).unwrap();
        assert!((out[[0, 0, 0]] - 131.85).abs() < 1e-4);
        assert!(out[[0, 0, 1]].abs() < 1e-4);
        assert!((out[[0, 0, 2]] + 103.06).abs() < 1e-4);
    }

    #[test]
    fn test_to_float() {
        let mut img = Array3::<u8>::zeros((1, 2, 3));
        img[[0, 1, 2]] = 200;
        let out = to_float(&img);
        assert!((out[[0, 1, 2]] - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_preprocess_array_normalizes_padding() {
        let img = Array3::<u8>::from_elem((100, 200, 3), 50);
        let pre = preprocess_array(&img, InputResolution::CPM).unwrap();
        assert_eq!(pre.tensor.dim(), (192, 192, 3));
        // Padded pixel carries only the mean offset.
        assert!((pre.tensor[[150, 10, 0]] + 123.15).abs() < 1e-4);
        assert!((pre.tensor[[10, 10, 0]] - (50.0 - 123.15)).abs() < 1.0);
    }
}
