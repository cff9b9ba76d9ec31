//! Frame compositor: rasterizes the visible slice of a timeline.
//!
//! One compositing pass fills the surface with the background color,
//! selects the elements visible at the requested time, resolves their
//! animated placement, and dispatches each to the renderer registered
//! for its filetype in ascending priority order.

use std::collections::HashMap;

use montage_animation_core::{resolve_props, ResolvedProps};
use montage_asset_store::AssetSource;
use montage_timeline_model::{FileType, Timeline, TimelineElement};

use crate::renderers::{
    GifRenderer, ImageRenderer, ShapeRenderer, TextRenderer, VideoRenderer,
};
use crate::surface::{parse_hex_color, Surface};

/// Rasterizes one element kind onto the surface.
///
/// Implementations skip silently when their asset is not loaded yet; a
/// missing bitmap renders as a skeleton frame, never an error.
pub trait ElementRenderer: Send + Sync {
    fn draw(
        &self,
        surface: &mut Surface,
        element: &TimelineElement,
        props: &ResolvedProps,
        time_ms: f64,
        assets: &dyn AssetSource,
    );
}

/// Filetype-keyed registry of element renderers.
///
/// Tests can register stubs to observe dispatch without rasterizing.
#[derive(Default)]
pub struct RendererSet {
    renderers: HashMap<FileType, Box<dyn ElementRenderer>>,
}

impl RendererSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in renderers. Audio has no visual renderer.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(FileType::Video, Box::new(VideoRenderer));
        set.register(FileType::Image, Box::new(ImageRenderer));
        set.register(FileType::Gif, Box::new(GifRenderer));
        set.register(FileType::Shape, Box::new(ShapeRenderer));
        set.register(FileType::Text, Box::new(TextRenderer));
        set
    }

    pub fn register(&mut self, filetype: FileType, renderer: Box<dyn ElementRenderer>) {
        self.renderers.insert(filetype, renderer);
    }

    pub fn get(&self, filetype: FileType) -> Option<&dyn ElementRenderer> {
        self.renderers.get(&filetype).map(|r| r.as_ref())
    }
}

/// Composite the timeline at `time_ms` onto the surface.
///
/// Output is a deterministic function of `(timeline, time_ms)` given the
/// same asset state: identical inputs composite identical pixels.
pub fn render_timeline_at_time(
    surface: &mut Surface,
    timeline: &Timeline,
    time_ms: f64,
    renderers: &RendererSet,
    assets: &dyn AssetSource,
    background_color: &str,
) {
    surface.fill(parse_hex_color(background_color));

    for element in timeline.visible_at(time_ms) {
        if !element.filetype().is_visual() {
            continue;
        }

        let start = timeline.effective_start(element);
        let props = resolve_props(element, start, time_ms);

        match renderers.get(element.filetype()) {
            Some(renderer) => renderer.draw(surface, element, &props, time_ms, assets),
            None => tracing::trace!(
                filetype = element.filetype().as_str(),
                key = element.key(),
                "No renderer registered for element"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use montage_asset_store::MemoryAssets;
    use montage_timeline_model::{ElementCommon, ImageElement, Point, VisualCommon};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingRenderer {
        calls: Arc<AtomicUsize>,
    }

    impl ElementRenderer for CountingRenderer {
        fn draw(
            &self,
            _surface: &mut Surface,
            _element: &TimelineElement,
            _props: &ResolvedProps,
            _time_ms: f64,
            _assets: &dyn AssetSource,
        ) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn image_element(key: &str, start_time: f64, duration: f64) -> TimelineElement {
        TimelineElement::Image(ImageElement {
            common: ElementCommon {
                key: key.to_string(),
                priority: 0,
                start_time,
                duration,
                location: Point::new(0.0, 0.0),
                local_path: String::new(),
                timeline_color: String::new(),
            },
            visual: VisualCommon::sized(10.0, 10.0),
            animation: Default::default(),
        })
    }

    #[test]
    fn test_background_fill_covers_surface() {
        let mut surface = Surface::new(6, 6).expect("surface");
        let timeline = Timeline::new();
        let renderers = RendererSet::with_defaults();
        let assets = MemoryAssets::new();

        render_timeline_at_time(&mut surface, &timeline, 0.0, &renderers, &assets, "#102030");

        for pixel in surface.image().pixels() {
            assert_eq!(*pixel, Rgba([16, 32, 48, 255]));
        }
    }

    #[test]
    fn test_dispatch_only_visible_elements() {
        let mut timeline = Timeline::new();
        timeline.insert(image_element("a", 0.0, 1000.0));
        timeline.insert(image_element("b", 5000.0, 1000.0));

        let calls = Arc::new(AtomicUsize::new(0));
        let mut renderers = RendererSet::new();
        renderers.register(
            FileType::Image,
            Box::new(CountingRenderer {
                calls: Arc::clone(&calls),
            }),
        );

        let mut surface = Surface::new(6, 6).expect("surface");
        let assets = MemoryAssets::new();
        render_timeline_at_time(&mut surface, &timeline, 500.0, &renderers, &assets, "#000000");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_filetype_is_skipped() {
        let mut timeline = Timeline::new();
        timeline.insert(image_element("a", 0.0, 1000.0));

        let mut surface = Surface::new(6, 6).expect("surface");
        let renderers = RendererSet::new();
        let assets = MemoryAssets::new();

        // No renderer for images registered; the pass must not panic.
        render_timeline_at_time(&mut surface, &timeline, 0.0, &renderers, &assets, "#000000");
    }
}
