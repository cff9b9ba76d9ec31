//! `MediaLibrary`: the production asset store.
//!
//! Preload decodes stills and gifs in memory, extracts video frame sequences
//! into the cache directory through ffmpeg, and loads fonts. Seeking then
//! reduces to picking and decoding the one extracted frame that covers the
//! requested source time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use rusttype::Font;
use tracing::{debug, info, warn};

use montage_common::{MontageError, MontageResult};
use montage_timeline_model::{FileType, Timeline, TimelineElement, TrimRange};

use crate::handle::{AssetHandle, GifAsset, ImageAsset, VideoAsset};
use crate::probe::{command_exists, probe_video_dimensions};
use crate::store::{AssetSource, AssetStore};

/// Rate video frame sequences are extracted at.
pub const VIDEO_EXTRACT_FPS: f64 = 30.0;

/// Delay applied to gifs whose header reports none.
const GIF_FALLBACK_DELAY_MS: f64 = 100.0;

/// Filesystem-backed asset store.
pub struct MediaLibrary {
    /// Base for resolving relative media paths (the project root).
    base_dir: PathBuf,

    /// Where extracted video frame sequences live.
    cache_dir: PathBuf,

    handles: HashMap<String, AssetHandle>,
    fonts: HashMap<String, Font<'static>>,
}

impl MediaLibrary {
    pub fn new(base_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache_dir: cache_dir.into(),
            handles: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    /// Number of resolved element handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn require_file(&self, raw: &str) -> MontageResult<PathBuf> {
        let path = self.resolve(raw);
        if path.is_file() {
            Ok(path)
        } else {
            Err(MontageError::FileNotFound { path })
        }
    }

    async fn load_image(&mut self, key: &str, raw_path: &str) -> MontageResult<()> {
        let path = self.require_file(raw_path)?;
        let pixels = decode_image(path).await?;
        debug!(key, width = pixels.width(), height = pixels.height(), "image loaded");
        self.handles
            .insert(key.to_string(), AssetHandle::Image(ImageAsset { pixels }));
        Ok(())
    }

    async fn load_gif(&mut self, key: &str, raw_path: &str) -> MontageResult<()> {
        let path = self.require_file(raw_path)?;
        let (frames, delay_ms) = decode_gif(path).await?;
        debug!(key, frames = frames.len(), delay_ms, "gif loaded");
        self.handles
            .insert(key.to_string(), AssetHandle::Gif(GifAsset { frames, delay_ms }));
        Ok(())
    }

    async fn load_video(&mut self, key: &str, element: &TimelineElement) -> MontageResult<()> {
        let source = self.require_file(element.local_path())?;

        if !command_exists("ffmpeg") {
            return Err(MontageError::unsupported(
                "ffmpeg not found on PATH; video elements cannot be decoded",
            ));
        }

        let (width, height) = probe_video_dimensions(&source).unwrap_or_else(|| {
            warn!(path = %source.display(), "ffprobe could not read video dimensions");
            (0, 0)
        });

        let frames_dir = self.cache_dir.join(format!("frames_{key}"));
        let frame_paths = extract_frames(&source, &frames_dir).await?;
        info!(
            key,
            frames = frame_paths.len(),
            dir = %frames_dir.display(),
            "video frame sequence ready"
        );

        self.handles.insert(
            key.to_string(),
            AssetHandle::Video(VideoAsset {
                source_path: source,
                width,
                height,
                extract_fps: VIDEO_EXTRACT_FPS,
                frame_paths,
                current_index: None,
                current: None,
            }),
        );
        Ok(())
    }

    async fn load_font(&mut self, raw_path: &str) -> MontageResult<()> {
        if raw_path.is_empty() || self.fonts.contains_key(raw_path) {
            return Ok(());
        }
        let path = self.resolve(raw_path);
        if !path.is_file() {
            warn!(path = %path.display(), "font file missing, text will render without glyphs");
            return Ok(());
        }
        let data = tokio::fs::read(&path).await?;
        match Font::try_from_vec(data) {
            Some(font) => {
                debug!(path = %path.display(), "font loaded");
                self.fonts.insert(raw_path.to_string(), font);
            }
            None => {
                warn!(path = %path.display(), "font file could not be parsed, skipping");
            }
        }
        Ok(())
    }
}

impl AssetSource for MediaLibrary {
    fn handle(&self, key: &str) -> Option<&AssetHandle> {
        self.handles.get(key)
    }

    fn font(&self, path: &str) -> Option<&Font<'static>> {
        self.fonts.get(path)
    }
}

impl AssetStore for MediaLibrary {
    async fn load_entire_timeline(&mut self, timeline: &Timeline) -> MontageResult<()> {
        for (key, element) in timeline.iter() {
            if self.handles.contains_key(key) {
                continue;
            }
            match element.filetype() {
                FileType::Image => self.load_image(key, element.local_path()).await?,
                FileType::Gif => self.load_gif(key, element.local_path()).await?,
                FileType::Video => self.load_video(key, element).await?,
                FileType::Audio => {
                    self.require_file(element.local_path())?;
                    self.handles.insert(key.clone(), AssetHandle::Audio);
                }
                FileType::Text => {
                    if let TimelineElement::Text(text) = element {
                        self.load_font(&text.font_path).await?;
                    }
                }
                FileType::Shape => {}
            }
        }
        info!(handles = self.handles.len(), fonts = self.fonts.len(), "timeline assets loaded");
        Ok(())
    }

    async fn seek(&mut self, timeline: &Timeline, time_ms: f64) -> MontageResult<()> {
        for (key, element) in timeline.iter() {
            if !timeline.is_visible_at(element, time_ms) {
                continue;
            }
            let TimelineElement::Video(video_element) = element else {
                continue;
            };
            let Some(AssetHandle::Video(video)) = self.handles.get_mut(key) else {
                continue;
            };

            let source_time = source_time_ms(
                &video_element.trim,
                video_element.speed,
                video_element.common.start_time,
                time_ms,
            );
            let index = video.frame_index_at(source_time);
            if video.current_index == Some(index) {
                continue;
            }
            let Some(path) = video.frame_paths.get(index).cloned() else {
                continue;
            };

            video.current = Some(decode_image(path).await?);
            video.current_index = Some(index);
        }
        Ok(())
    }
}

/// Source-media time for an element being played at `time_ms`: the elapsed
/// timeline time scaled by speed, offset into the trim range and clamped to
/// it.
pub(crate) fn source_time_ms(
    trim: &TrimRange,
    speed: f64,
    start_time: f64,
    time_ms: f64,
) -> f64 {
    let raw = trim.start_time + (time_ms - start_time) * speed;
    let end = trim.end_time.max(trim.start_time);
    raw.clamp(trim.start_time, end)
}

async fn decode_image(path: PathBuf) -> MontageResult<RgbaImage> {
    tokio::task::spawn_blocking(move || {
        image::open(&path)
            .map(|img| img.to_rgba8())
            .map_err(|e| MontageError::asset(format!("failed to decode {}: {e}", path.display())))
    })
    .await
    .map_err(blocking_failed)?
}

async fn decode_gif(path: PathBuf) -> MontageResult<(Vec<RgbaImage>, f64)> {
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        let decoder = GifDecoder::new(std::io::BufReader::new(file))
            .map_err(|e| MontageError::asset(format!("failed to open gif {}: {e}", path.display())))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| MontageError::asset(format!("failed to decode gif {}: {e}", path.display())))?;

        let delay_ms = match frames.first() {
            Some(frame) => {
                let (numer, denom) = frame.delay().numer_denom_ms();
                if numer == 0 || denom == 0 {
                    warn!(path = %path.display(), "gif reports zero frame delay, using 100 ms");
                    GIF_FALLBACK_DELAY_MS
                } else {
                    f64::from(numer) / f64::from(denom)
                }
            }
            None => GIF_FALLBACK_DELAY_MS,
        };

        let frames = frames.into_iter().map(image::Frame::into_buffer).collect();
        Ok((frames, delay_ms))
    })
    .await
    .map_err(blocking_failed)?
}

/// Run ffmpeg to extract a frame sequence, reusing a non-empty cache dir
/// from a previous load.
async fn extract_frames(source: &Path, frames_dir: &Path) -> MontageResult<Vec<PathBuf>> {
    let cached = list_frames(frames_dir).await?;
    if !cached.is_empty() {
        debug!(dir = %frames_dir.display(), frames = cached.len(), "reusing extracted frames");
        return Ok(cached);
    }

    tokio::fs::create_dir_all(frames_dir).await?;
    let pattern = frames_dir.join("frame_%05d.png");
    let status = tokio::process::Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(source)
        .args(["-vf", &format!("fps={VIDEO_EXTRACT_FPS}"), "-f", "image2"])
        .arg(&pattern)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    if !status.success() {
        return Err(MontageError::asset(format!(
            "ffmpeg failed to extract frames from {}",
            source.display()
        )));
    }

    let frames = list_frames(frames_dir).await?;
    if frames.is_empty() {
        return Err(MontageError::asset(format!(
            "ffmpeg produced no frames for {}",
            source.display()
        )));
    }
    Ok(frames)
}

async fn list_frames(frames_dir: &Path) -> MontageResult<Vec<PathBuf>> {
    if !frames_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(frames_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "png") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

fn blocking_failed(e: tokio::task::JoinError) -> MontageError {
    MontageError::asset(format!("decode task failed: {e}"))
}
