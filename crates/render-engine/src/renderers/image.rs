//! Still image renderer.

use montage_animation_core::ResolvedProps;
use montage_asset_store::{AssetHandle, AssetSource};
use montage_timeline_model::TimelineElement;

use crate::compositor::ElementRenderer;
use crate::raster::{place_bitmap, Placement};
use crate::surface::Surface;

pub struct ImageRenderer;

impl ElementRenderer for ImageRenderer {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        _time_ms: f64,
        assets: &dyn AssetSource,
    ) {
        let TimelineElement::Image(image) = element else {
            return;
        };
        let Some(asset) = assets.handle(&image.common.key).and_then(AssetHandle::as_image)
        else {
            return;
        };

        let placement = Placement::from_props(&image.visual, props);
        place_bitmap(surface.image_mut(), &asset.pixels, &placement);
    }
}
