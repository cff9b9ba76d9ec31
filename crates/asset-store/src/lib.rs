//! Montage Asset Store
//!
//! Resolves timeline media references into ready-to-sample resources and
//! keeps them frame-accurate while the compositor runs:
//! - **Handles:** decoded images, gif frame sequences, seekable video frames
//! - **MediaLibrary:** the filesystem/ffmpeg-backed implementation
//! - **MemoryAssets:** an in-memory store for tests and presets
//!
//! The compositor reads through `AssetSource`; the export pipeline drives
//! `AssetStore::{load_entire_timeline, seek}`, its two suspension points.

pub mod handle;
pub mod library;
pub mod memory;
pub mod probe;
pub mod store;

pub use handle::{AssetHandle, GifAsset, ImageAsset, VideoAsset};
pub use library::{MediaLibrary, VIDEO_EXTRACT_FPS};
pub use memory::MemoryAssets;
pub use probe::{command_exists, probe_duration_ms, probe_video_dimensions};
pub use store::{AssetSource, AssetStore};
