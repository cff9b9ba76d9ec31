//! Shared raster operations for the bitmap-backed renderers.

use image::imageops::{overlay, resize, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use montage_animation_core::ResolvedProps;
use montage_timeline_model::VisualCommon;

/// Where and how a decoded bitmap lands on the canvas.
///
/// Scale grows the element about its own center: the top-left shifts back
/// by half the growth so the center point stays fixed under animation.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub alpha: f64,
    pub rotation_deg: f64,
}

impl Placement {
    pub fn from_props(visual: &VisualCommon, props: &ResolvedProps) -> Self {
        Self {
            x: props.x,
            y: props.y,
            width: visual.width,
            height: visual.height,
            scale: props.scale,
            alpha: props.alpha(),
            rotation_deg: props.rotation,
        }
    }
}

/// Draw `source` onto `canvas` per the placement: resize to the scaled
/// element size with a triangle filter, multiply alpha, rotate about the
/// element center, then alpha-composite.
pub fn place_bitmap(canvas: &mut RgbaImage, source: &RgbaImage, placement: &Placement) {
    let scaled_w = placement.width * placement.scale;
    let scaled_h = placement.height * placement.scale;

    let target_w = scaled_w.round().max(0.0) as u32;
    let target_h = scaled_h.round().max(0.0) as u32;
    if target_w == 0 || target_h == 0 || source.width() == 0 || source.height() == 0 {
        return;
    }

    let offset_x = placement.x - (scaled_w - placement.width) * 0.5;
    let offset_y = placement.y - (scaled_h - placement.height) * 0.5;

    let mut working = if source.dimensions() == (target_w, target_h) {
        source.clone()
    } else {
        resize(source, target_w, target_h, FilterType::Triangle)
    };
    apply_alpha(&mut working, placement.alpha);

    if placement.rotation_deg.abs() <= 0.01 {
        overlay(
            canvas,
            &working,
            offset_x.round() as i64,
            offset_y.round() as i64,
        );
        return;
    }

    let rotated = rotate_rgba(&working, placement.rotation_deg);
    let center_x = offset_x + scaled_w * 0.5;
    let center_y = offset_y + scaled_h * 0.5;
    let dest_x = (center_x - f64::from(rotated.width()) * 0.5).round() as i64;
    let dest_y = (center_y - f64::from(rotated.height()) * 0.5).round() as i64;
    overlay(canvas, &rotated, dest_x, dest_y);
}

/// Multiply every pixel's alpha channel by `alpha` in `[0, 1]`.
pub fn apply_alpha(image: &mut RgbaImage, alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return;
    }

    for pixel in image.pixels_mut() {
        pixel.0[3] = (f64::from(pixel.0[3]) * alpha).round().clamp(0.0, 255.0) as u8;
    }
}

/// Rotate about the image center, expanding the canvas first so the
/// corners are not clipped.
pub fn rotate_rgba(image: &RgbaImage, rotation_deg: f64) -> RgbaImage {
    let angle = (rotation_deg as f32).to_radians();
    let (sin, cos) = angle.sin_cos();
    let abs_sin = sin.abs();
    let abs_cos = cos.abs();
    let src_w = image.width().max(1) as f32;
    let src_h = image.height().max(1) as f32;
    let new_w = (src_w * abs_cos + src_h * abs_sin).ceil().max(1.0) as u32;
    let new_h = (src_w * abs_sin + src_h * abs_cos).ceil().max(1.0) as u32;

    let mut expanded = RgbaImage::from_pixel(new_w, new_h, Rgba([0, 0, 0, 0]));
    let offset_x = ((new_w as f32 - src_w) * 0.5).round() as i64;
    let offset_y = ((new_h as f32 - src_h) * 0.5).round() as i64;
    overlay(&mut expanded, image, offset_x, offset_y);

    rotate_about_center(&expanded, angle, Interpolation::Bilinear, Rgba([0, 0, 0, 0]))
}
