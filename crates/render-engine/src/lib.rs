//! Montage Render Engine
//!
//! Composites the timeline into pixels and streams them out:
//! - **Compositor:** one pure rasterization pass per frame — fill the
//!   background, pick the elements active at the cursor, draw them in
//!   priority order with their resolved animation properties
//! - **Renderers:** the per-filetype drawing passes (video, image, gif,
//!   shape, text)
//! - **Export:** the sequential frame loop with asset seeking, PNG
//!   serialization on the blocking pool, and sink backpressure
//! - **Sinks:** ffmpeg stdin piping, PNG directories, test collectors
//!
//! Given the same asset state, compositing is deterministic: identical
//! `(timeline, time_ms)` inputs produce identical pixels.

pub mod compositor;
pub mod export;
pub mod raster;
pub mod renderers;
pub mod sink;
pub mod surface;

pub use compositor::{render_timeline_at_time, ElementRenderer, RendererSet};
pub use export::{render_timeline, ExportProgress, ExportStage, ProgressCallback};
pub use sink::{CollectSink, FfmpegSink, FrameSink, PngDirSink};
pub use surface::{parse_hex_color, Surface};
