//! An in-memory asset store for tests, demos, and preset rendering.

use std::collections::HashMap;

use rusttype::Font;

use montage_common::MontageResult;
use montage_timeline_model::Timeline;

use crate::handle::AssetHandle;
use crate::store::{AssetSource, AssetStore};

/// Serves pre-inserted handles without touching the filesystem, and records
/// the load/seek calls it receives.
#[derive(Default)]
pub struct MemoryAssets {
    handles: HashMap<String, AssetHandle>,
    fonts: HashMap<String, Font<'static>>,
    load_calls: usize,
    seek_times: Vec<f64>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, handle: AssetHandle) {
        self.handles.insert(key.into(), handle);
    }

    pub fn insert_font(&mut self, path: impl Into<String>, font: Font<'static>) {
        self.fonts.insert(path.into(), font);
    }

    /// How many times `load_entire_timeline` ran.
    pub fn load_calls(&self) -> usize {
        self.load_calls
    }

    /// Every `seek` time received, in call order.
    pub fn seek_times(&self) -> &[f64] {
        &self.seek_times
    }
}

impl AssetSource for MemoryAssets {
    fn handle(&self, key: &str) -> Option<&AssetHandle> {
        self.handles.get(key)
    }

    fn font(&self, path: &str) -> Option<&Font<'static>> {
        self.fonts.get(path)
    }
}

impl AssetStore for MemoryAssets {
    async fn load_entire_timeline(&mut self, _timeline: &Timeline) -> MontageResult<()> {
        self.load_calls += 1;
        Ok(())
    }

    async fn seek(&mut self, _timeline: &Timeline, time_ms: f64) -> MontageResult<()> {
        self.seek_times.push(time_ms);
        Ok(())
    }
}
