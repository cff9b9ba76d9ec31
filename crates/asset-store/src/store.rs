//! The asset-store contract consumed by the compositor and export pipeline.

use montage_common::MontageResult;
use montage_timeline_model::Timeline;
use rusttype::Font;

use crate::handle::AssetHandle;

/// Read access to resolved assets. Object-safe; element renderers take
/// `&dyn AssetSource`.
pub trait AssetSource {
    /// The resolved handle for an element key, if one was loaded.
    fn handle(&self, key: &str) -> Option<&AssetHandle>;

    /// A loaded font by its filesystem path.
    fn font(&self, path: &str) -> Option<&Font<'static>>;
}

/// Preload and seek, the two suspension points the export pipeline drives.
#[allow(async_fn_in_trait)]
pub trait AssetStore: AssetSource {
    /// Resolve every media reference in the timeline into a ready-to-sample
    /// resource. Completes before the first frame is rendered.
    async fn load_entire_timeline(&mut self, timeline: &Timeline) -> MontageResult<()>;

    /// For every time-based element active at `time_ms`, advance its media
    /// handle to `trim.start_time + (time_ms - start_time) * speed`, clamped
    /// into the trim range, suspending until the frame is decoded. Elements
    /// inactive at `time_ms` are left untouched.
    async fn seek(&mut self, timeline: &Timeline, time_ms: f64) -> MontageResult<()>;
}
