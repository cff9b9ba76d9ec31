//! Text renderer: greedy wrap, alignment, background and outline styling.

use image::{Rgba, RgbaImage};
use montage_animation_core::ResolvedProps;
use montage_asset_store::AssetSource;
use montage_timeline_model::{TextAlign, TimelineElement};
use rusttype::{point, Font, Scale};

use crate::compositor::ElementRenderer;
use crate::surface::{parse_hex_color, Surface};

/// Horizontal padding around a line's background rect.
const BACKGROUND_PADDING: f64 = 12.0;

pub struct TextRenderer;

impl ElementRenderer for TextRenderer {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        _time_ms: f64,
        assets: &dyn AssetSource,
    ) {
        let TimelineElement::Text(text) = element else {
            return;
        };
        if text.text.is_empty() {
            return;
        }
        let Some(font) = assets.font(&text.font_path) else {
            tracing::debug!(
                key = text.common.key.as_str(),
                font_path = text.font_path.as_str(),
                "Font not loaded; skipping text element"
            );
            return;
        };

        let alpha = props.alpha();
        if alpha <= 0.0 {
            return;
        }

        // Scale animation grows the glyphs; the first baseline stays at the
        // authored font size so the block does not drift vertically.
        let glyph_size = (text.font_size * props.scale).max(1.0);
        let scale = Scale::uniform(glyph_size as f32);

        let wrap_width = if text.width_inner > 0.0 {
            text.width_inner
        } else {
            text.visual.width
        };
        let lines = wrap_lines(
            |s| measure_text(font, scale, s, text.letter_spacing),
            &text.text,
            wrap_width,
        );

        let fill = parse_hex_color(&text.text_color);
        let v_metrics = font.v_metrics(scale);
        let ascent = f64::from(v_metrics.ascent);
        let descent = f64::from(-v_metrics.descent);
        let line_height = text.visual.height;

        let mut baseline_y = props.y + text.font_size;
        for line in &lines {
            let line_x = match text.align {
                TextAlign::Left => props.x,
                TextAlign::Center => props.x + (text.visual.width - line.width) / 2.0,
                TextAlign::Right => props.x + text.visual.width - line.width,
            };

            if text.background.enable {
                fill_rect(
                    surface.image_mut(),
                    line_x - BACKGROUND_PADDING,
                    baseline_y - ascent - BACKGROUND_PADDING,
                    line.width + BACKGROUND_PADDING * 2.0,
                    ascent + descent + BACKGROUND_PADDING * 2.0,
                    parse_hex_color(&text.background.color),
                    alpha,
                );
            }

            if text.outline.enable && text.outline.size > 0.0 {
                let stroke = parse_hex_color(&text.outline.color);
                let radius = (text.outline.size / 2.0).ceil() as i32;
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        if dx * dx + dy * dy > radius * radius {
                            continue;
                        }
                        draw_line(
                            surface.image_mut(),
                            font,
                            scale,
                            &line.text,
                            line_x + f64::from(dx),
                            baseline_y + f64::from(dy),
                            text.letter_spacing,
                            stroke,
                            alpha,
                        );
                    }
                }
            }

            draw_line(
                surface.image_mut(),
                font,
                scale,
                &line.text,
                line_x,
                baseline_y,
                text.letter_spacing,
                fill,
                alpha,
            );

            baseline_y += line_height;
        }
    }
}

struct Line {
    text: String,
    width: f64,
}

/// Greedy word wrap: words join the current line while the candidate still
/// fits; a word that does not fit starts the next line and an overlong
/// single word overflows rather than breaking mid-word.
fn wrap_lines<F: Fn(&str) -> f64>(measure: F, text: &str, wrap_width: f64) -> Vec<Line> {
    let mut words = text.split(' ');
    let mut current = words.next().unwrap_or("").to_string();
    let mut lines = Vec::new();

    for word in words {
        let candidate = format!("{current} {word}");
        if measure(&candidate) < wrap_width {
            current = candidate;
        } else {
            let width = measure(&current);
            lines.push(Line {
                text: current,
                width,
            });
            current = word.to_string();
        }
    }

    let width = measure(&current);
    lines.push(Line {
        text: current,
        width,
    });
    lines
}

/// Advance width of a run, including per-character letter spacing.
fn measure_text(font: &Font<'_>, scale: Scale, text: &str, letter_spacing: f64) -> f64 {
    let mut width = 0.0;
    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale);
        width += f64::from(glyph.h_metrics().advance_width) + letter_spacing;
    }
    width
}

#[allow(clippy::too_many_arguments)]
fn draw_line(
    canvas: &mut RgbaImage,
    font: &Font<'_>,
    scale: Scale,
    text: &str,
    origin_x: f64,
    baseline_y: f64,
    letter_spacing: f64,
    color: Rgba<u8>,
    alpha: f64,
) {
    let color_alpha = alpha * f64::from(color.0[3]) / 255.0;
    if color_alpha <= 0.0 {
        return;
    }

    let mut caret = origin_x;
    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale);
        let advance = f64::from(glyph.h_metrics().advance_width);
        let positioned = glyph.positioned(point(caret as f32, baseline_y as f32));

        if let Some(bb) = positioned.pixel_bounding_box() {
            positioned.draw(|gx, gy, coverage| {
                blend_pixel(
                    canvas,
                    bb.min.x + gx as i32,
                    bb.min.y + gy as i32,
                    color,
                    f64::from(coverage) * color_alpha,
                );
            });
        }

        caret += advance + letter_spacing;
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: f64, y: f64, w: f64, h: f64, color: Rgba<u8>, alpha: f64) {
    let alpha = alpha * f64::from(color.0[3]) / 255.0;
    if alpha <= 0.0 || w <= 0.0 || h <= 0.0 {
        return;
    }

    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = ((x + w).round().max(0.0) as u32).min(canvas.width());
    let y1 = ((y + h).round().max(0.0) as u32).min(canvas.height());

    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(canvas, px as i32, py as i32, color, alpha);
        }
    }
}

/// Source-over blend of one pixel; coordinates outside the canvas are
/// dropped, which is how drawing above the element origin clips.
fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, alpha: f64) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let src = f64::from(color.0[c]);
        let dst = f64::from(pixel.0[c]);
        pixel.0[c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    let dst_a = f64::from(pixel.0[3]) / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    pixel.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 px per character, like a monospace face.
    fn fixed_measure(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        let lines = wrap_lines(fixed_measure, "hello world", 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "hello world");
        assert_eq!(lines[0].width, 110.0);
    }

    #[test]
    fn test_wrap_breaks_at_word_boundaries() {
        // "alpha beta" is 100 px, not < 100, so beta wraps.
        let lines = wrap_lines(fixed_measure, "alpha beta gamma", 100.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_overlong_word_overflows_without_breaking() {
        let lines = wrap_lines(fixed_measure, "hi incomprehensibilities yo", 100.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "incomprehensibilities", "yo"]);
        assert!(lines[1].width > 100.0);
    }

    #[test]
    fn test_blend_pixel_source_over() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, 0, 0, Rgba([255, 255, 255, 255]), 0.5);
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([128, 128, 128, 255]));

        // Out-of-bounds writes are dropped.
        blend_pixel(&mut canvas, -1, 0, Rgba([255, 0, 0, 255]), 1.0);
        blend_pixel(&mut canvas, 0, 5, Rgba([255, 0, 0, 255]), 1.0);
    }

    #[test]
    fn test_fill_rect_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect(
            &mut canvas,
            -2.0,
            -2.0,
            4.0,
            4.0,
            Rgba([255, 0, 0, 255]),
            1.0,
        );

        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([0, 0, 0, 255]));
    }
}
