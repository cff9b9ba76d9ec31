//! Render and export option types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output settings shared by preview rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Frames per second of the output.
    pub fps: u32,

    /// Output duration in seconds.
    pub duration: f64,

    /// Canvas fill behind all elements, as a hex color.
    pub background_color: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 60,
            duration: 10.0,
            background_color: "#000000".to_string(),
        }
    }
}

impl RenderOptions {
    /// Number of frames the output contains.
    pub fn total_frames(&self) -> u64 {
        (self.fps as f64 * self.duration).floor() as u64
    }

    /// Milliseconds covered by one frame.
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// Timeline instant of frame `index`, in milliseconds.
    pub fn frame_time_ms(&self, index: u64) -> f64 {
        index as f64 / self.fps as f64 * 1000.0
    }

    /// Output duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration * 1000.0
    }
}

/// A full export request: render settings plus encoder-facing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Destination file for the encoded output.
    pub output_path: PathBuf,

    /// Target video bitrate in kbit/s.
    #[serde(default = "default_bitrate_kbps")]
    pub video_bitrate_kbps: u32,

    #[serde(flatten)]
    pub render: RenderOptions,
}

fn default_bitrate_kbps() -> u32 {
    5000
}

impl ExportOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            video_bitrate_kbps: default_bitrate_kbps(),
            render: RenderOptions::default(),
        }
    }
}
