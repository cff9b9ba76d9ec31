//! Video frame renderer with the per-element filter chain.

use image::RgbaImage;
use imageproc::filter::gaussian_blur_f32;
use montage_animation_core::ResolvedProps;
use montage_asset_store::{AssetHandle, AssetSource};
use montage_timeline_model::{FilterKind, TimelineElement, VideoElement};

use crate::compositor::ElementRenderer;
use crate::raster::{place_bitmap, Placement};
use crate::surface::Surface;

/// Normalized RGB distance below which a chromakeyed pixel turns
/// transparent. Matches the editor preview shader.
const CHROMAKEY_THRESHOLD: f64 = 0.5;

pub struct VideoRenderer;

impl ElementRenderer for VideoRenderer {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        time_ms: f64,
        assets: &dyn AssetSource,
    ) {
        let TimelineElement::Video(video) = element else {
            return;
        };

        // The trimmed span is the only window with decodable frames; the
        // element is hidden outside it even while nominally visible.
        let start = video.common.start_time;
        if !(time_ms >= start + video.trim.start_time && time_ms < start + video.trim.end_time) {
            return;
        }

        let Some(asset) = assets.handle(&video.common.key).and_then(AssetHandle::as_video)
        else {
            return;
        };
        let Some(frame) = asset.current_frame() else {
            return;
        };

        let placement = Placement::from_props(&video.visual, props);
        match apply_filters(video, frame) {
            Some(filtered) => place_bitmap(surface.image_mut(), &filtered, &placement),
            None => place_bitmap(surface.image_mut(), frame, &placement),
        }
    }
}

/// Run the element's filter chain over the decoded frame. Returns `None`
/// when no filter applies, so the unfiltered frame can be drawn without a
/// copy.
fn apply_filters(video: &VideoElement, frame: &RgbaImage) -> Option<RgbaImage> {
    if !video.filter.enable {
        return None;
    }
    let filter = video.filter.list.first()?;

    match filter.name {
        FilterKind::Chromakey => {
            let (r, g, b) = parse_rgb_params(&filter.value);
            Some(chromakey(frame, r, g, b))
        }
        FilterKind::Blur => {
            let sigma = parse_blur_factor(&filter.value);
            if sigma > 0.0 {
                Some(gaussian_blur_f32(frame, sigma))
            } else {
                None
            }
        }
        FilterKind::Radialblur => {
            tracing::debug!(
                key = video.common.key.as_str(),
                "Radial blur is not supported by the CPU rasterizer; drawing unfiltered"
            );
            None
        }
    }
}

/// Key out pixels near the key color: normalized euclidean RGB distance
/// under the threshold becomes fully transparent.
fn chromakey(frame: &RgbaImage, key_r: u8, key_g: u8, key_b: u8) -> RgbaImage {
    let key = [
        f64::from(key_r) / 255.0,
        f64::from(key_g) / 255.0,
        f64::from(key_b) / 255.0,
    ];

    let mut out = frame.clone();
    for pixel in out.pixels_mut() {
        let dr = f64::from(pixel.0[0]) / 255.0 - key[0];
        let dg = f64::from(pixel.0[1]) / 255.0 - key[1];
        let db = f64::from(pixel.0[2]) / 255.0 - key[2];
        if (dr * dr + dg * dg + db * db).sqrt() < CHROMAKEY_THRESHOLD {
            pixel.0 = [0, 0, 0, 0];
        }
    }
    out
}

/// Parse `r=..:g=..:b=..` filter parameters; absent keys default to 0.
fn parse_rgb_params(value: &str) -> (u8, u8, u8) {
    let (mut r, mut g, mut b) = (0u8, 0u8, 0u8);
    for part in value.split(':') {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        let Ok(parsed) = raw.trim().parse::<i64>() else {
            continue;
        };
        let clamped = parsed.clamp(0, 255) as u8;
        match key.trim() {
            "r" => r = clamped,
            "g" => g = clamped,
            "b" => b = clamped,
            _ => {}
        }
    }
    (r, g, b)
}

/// Parse the `f=..` strength parameter; absent or invalid yields 0.
fn parse_blur_factor(value: &str) -> f32 {
    for part in value.split(':') {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        if key.trim() == "f" {
            if let Ok(parsed) = raw.trim().parse::<f32>() {
                return parsed.max(0.0);
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_parse_rgb_params() {
        assert_eq!(parse_rgb_params("r=0:g=255:b=0"), (0, 255, 0));
        assert_eq!(parse_rgb_params("r=300:b=-5"), (255, 0, 0));
        assert_eq!(parse_rgb_params("garbage"), (0, 0, 0));
    }

    #[test]
    fn test_parse_blur_factor() {
        assert_eq!(parse_blur_factor("f=4"), 4.0);
        assert_eq!(parse_blur_factor("f=-2"), 0.0);
        assert_eq!(parse_blur_factor("r=0:g=255"), 0.0);
    }

    #[test]
    fn test_chromakey_removes_key_color() {
        let mut frame = RgbaImage::from_pixel(2, 1, Rgba([0, 255, 0, 255]));
        frame.put_pixel(1, 0, Rgba([255, 0, 0, 255]));

        let keyed = chromakey(&frame, 0, 255, 0);

        assert_eq!(keyed.get_pixel(0, 0).0[3], 0);
        assert_eq!(*keyed.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_chromakey_keeps_near_but_distinct_colors() {
        // Pure white sits well outside the 0.5 distance sphere of green.
        let frame = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let keyed = chromakey(&frame, 0, 255, 0);
        assert_eq!(keyed.get_pixel(0, 0).0[3], 255);
    }
}
