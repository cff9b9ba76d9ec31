//! Animated gif renderer. Frames cycle on the source's own delay.

use montage_animation_core::ResolvedProps;
use montage_asset_store::{AssetHandle, AssetSource};
use montage_timeline_model::TimelineElement;

use crate::compositor::ElementRenderer;
use crate::raster::{place_bitmap, Placement};
use crate::surface::Surface;

pub struct GifRenderer;

impl ElementRenderer for GifRenderer {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        time_ms: f64,
        assets: &dyn AssetSource,
    ) {
        let TimelineElement::Gif(gif) = element else {
            return;
        };
        let Some(asset) = assets.handle(&gif.common.key).and_then(AssetHandle::as_gif) else {
            return;
        };

        let elapsed_ms = time_ms - gif.common.start_time;
        let Some(frame) = asset.frame_at(elapsed_ms) else {
            return;
        };

        let placement = Placement::from_props(&gif.visual, props);
        place_bitmap(surface.image_mut(), frame, &placement);
    }
}
