//! Filled polygon renderer for shape elements.

use image::imageops::overlay;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use montage_animation_core::ResolvedProps;
use montage_asset_store::AssetSource;
use montage_timeline_model::TimelineElement;

use crate::compositor::ElementRenderer;
use crate::surface::{parse_hex_color, Surface};

pub struct ShapeRenderer;

impl ElementRenderer for ShapeRenderer {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        _time_ms: f64,
        _assets: &dyn AssetSource,
    ) {
        let TimelineElement::Shape(shape) = element else {
            return;
        };
        if shape.o_width <= 0.0 || shape.visual.width <= 0.0 {
            return;
        }

        // Points are authored against the design-space size; dividing by
        // the ratio maps them onto the placed element box.
        let ratio = shape.o_width / shape.visual.width;
        let mut polygon: Vec<Point<i32>> = shape
            .points
            .iter()
            .map(|p| {
                Point::new(
                    (p[0] / ratio + props.x).round() as i32,
                    (p[1] / ratio + props.y).round() as i32,
                )
            })
            .collect();

        // draw_polygon_mut wants an open path.
        while polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }
        if polygon.len() < 3 {
            return;
        }

        let fill = parse_hex_color(&shape.fill_color);
        let alpha = (f64::from(fill.0[3]) * props.alpha()).round() as u8;
        if alpha == 0 {
            return;
        }

        // Rasterize into a transparent scratch layer so the fill alpha
        // composites over what is already on the surface.
        let mut scratch = RgbaImage::new(surface.width(), surface.height());
        draw_polygon_mut(
            &mut scratch,
            &polygon,
            Rgba([fill.0[0], fill.0[1], fill.0[2], alpha]),
        );
        overlay(surface.image_mut(), &scratch, 0, 0);
    }
}
