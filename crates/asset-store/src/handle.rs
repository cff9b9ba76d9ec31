//! Resolved asset handles: what a media reference becomes after preload.

use std::path::PathBuf;

use image::RgbaImage;

/// A decoded still image.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub pixels: RgbaImage,
}

/// A decoded gif: every frame plus the first frame's delay.
#[derive(Debug, Clone)]
pub struct GifAsset {
    pub frames: Vec<RgbaImage>,

    /// Delay between frames in milliseconds. Gifs reporting a zero delay
    /// fall back to 100 ms at decode time.
    pub delay_ms: f64,
}

impl GifAsset {
    /// Frame shown `elapsed_ms` after the element starts; the sequence
    /// cycles forever.
    pub fn frame_at(&self, elapsed_ms: f64) -> Option<&RgbaImage> {
        if self.frames.is_empty() {
            return None;
        }
        let index = (elapsed_ms.max(0.0) / self.delay_ms).floor() as usize % self.frames.len();
        self.frames.get(index)
    }
}

/// A seekable video: an extracted frame sequence on disk plus the one frame
/// currently decoded into memory.
#[derive(Debug, Clone)]
pub struct VideoAsset {
    pub source_path: PathBuf,

    /// Probed source dimensions (0x0 when probing failed).
    pub width: u32,
    pub height: u32,

    /// Rate the frame sequence was extracted at.
    pub extract_fps: f64,

    pub(crate) frame_paths: Vec<PathBuf>,
    pub(crate) current_index: Option<usize>,
    pub(crate) current: Option<RgbaImage>,
}

impl VideoAsset {
    /// Number of extracted frames.
    pub fn frame_count(&self) -> usize {
        self.frame_paths.len()
    }

    /// The frame positioned by the last `seek`, if any.
    pub fn current_frame(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    /// Index of the extracted frame covering `source_time_ms`.
    pub fn frame_index_at(&self, source_time_ms: f64) -> usize {
        let index = (source_time_ms.max(0.0) / 1000.0 * self.extract_fps).floor() as usize;
        index.min(self.frame_paths.len().saturating_sub(1))
    }
}

/// One element's resolved media.
#[derive(Debug, Clone)]
pub enum AssetHandle {
    Image(ImageAsset),
    Gif(GifAsset),
    Video(VideoAsset),

    /// Audio contributes no pixels; the handle only records that the source
    /// resolved at load time.
    Audio,
}

impl AssetHandle {
    pub fn as_image(&self) -> Option<&ImageAsset> {
        match self {
            AssetHandle::Image(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_gif(&self) -> Option<&GifAsset> {
        match self {
            AssetHandle::Gif(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoAsset> {
        match self {
            AssetHandle::Video(asset) => Some(asset),
            _ => None,
        }
    }
}
