//! Timeline element types.
//!
//! An element is one media/shape/text item placed on the timeline with a
//! time range, a position, and (for the animatable kinds) a channel set.
//! The union is tagged on `filetype`; the variant payloads share common
//! placement fields through serde-flattened component structs.

use serde::{Deserialize, Serialize};

use crate::animation::{ElementAnimation, ShapeAnimation};

/// Element kind discriminant, mirrored by the `filetype` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Video,
    Image,
    Gif,
    Shape,
    Text,
    Audio,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Video => "video",
            FileType::Image => "image",
            FileType::Gif => "gif",
            FileType::Shape => "shape",
            FileType::Text => "text",
            FileType::Audio => "audio",
        }
    }

    /// Dynamic kinds play back decoded media over time; their on-timeline
    /// span scales with playback speed.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FileType::Video | FileType::Audio)
    }

    /// Kinds that rasterize pixels (everything except audio).
    pub fn is_visual(&self) -> bool {
        !matches!(self, FileType::Audio)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D point in source-resolution units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sub-range inside the source media, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TrimRange {
    pub start_time: f64,
    pub end_time: f64,
}

/// Fields shared by every element variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCommon {
    /// Unique element key (opaque ID, also the map key).
    pub key: String,

    /// Stacking order; ascending priority draws later, therefore on top.
    pub priority: i32,

    /// Placement on the timeline, in milliseconds.
    pub start_time: f64,

    /// Length of the element's own content, in milliseconds.
    pub duration: f64,

    /// Top-left corner in source-resolution units.
    pub location: Point,

    /// Filesystem reference to the backing media (empty for shapes).
    #[serde(default)]
    pub local_path: String,

    /// Track color shown in the timeline UI.
    #[serde(default)]
    pub timeline_color: String,
}

/// Fields shared by the visual variants (everything except audio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualCommon {
    /// Placed width in source-resolution units.
    pub width: f64,

    /// Placed height in source-resolution units.
    pub height: f64,

    /// Aspect ratio captured when the element was placed.
    pub ratio: f64,

    /// Base opacity, 0-100.
    pub opacity: f64,

    /// Base rotation in degrees.
    pub rotation: f64,
}

impl VisualCommon {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ratio: if height > 0.0 { width / height } else { 1.0 },
            opacity: 100.0,
            rotation: 0.0,
        }
    }
}

/// Pixel filter applied to a video frame before placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFilter {
    pub name: FilterKind,

    /// Filter parameters as `key=value` pairs joined by `:` (for example
    /// `r=0:g=255:b=0:f=0.4` for a green-screen key).
    pub value: String,
}

/// Supported video filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Chromakey,
    Blur,
    Radialblur,
}

/// Ordered filter chain on a video element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterChain {
    pub enable: bool,
    pub list: Vec<VideoFilter>,
}

/// Pixel dimensions of the decoded source media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceSize {
    pub width: u32,
    pub height: u32,
}

/// Horizontal text alignment inside the wrap box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Optional stroke drawn under the text fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TextOutline {
    pub enable: bool,
    pub size: f64,
    pub color: String,
}

/// Optional solid rect drawn behind each text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TextBackground {
    pub enable: bool,
    pub color: String,
}

/// A video placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    #[serde(flatten)]
    pub visual: VisualCommon,

    /// Sub-range of the source actually played.
    pub trim: TrimRange,

    /// Playback-rate multiplier; the on-timeline span is `duration / speed`.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Whether the source carries an audio stream worth mapping at export.
    #[serde(default)]
    pub is_exist_audio: bool,

    /// Decoded source dimensions.
    #[serde(default)]
    pub source_size: SourceSize,

    #[serde(default)]
    pub filter: FilterChain,

    #[serde(default)]
    pub animation: ElementAnimation,
}

/// A still image placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    #[serde(flatten)]
    pub visual: VisualCommon,

    #[serde(default)]
    pub animation: ElementAnimation,
}

/// An animated gif; frames cycle by the source's own frame delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    #[serde(flatten)]
    pub visual: VisualCommon,
}

/// A filled polygon authored in the shape editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    #[serde(flatten)]
    pub visual: VisualCommon,

    /// Design-space width the polygon points were authored against.
    pub o_width: f64,

    /// Design-space height the polygon points were authored against.
    pub o_height: f64,

    /// Polygon vertices in design-space units.
    pub points: Vec<[f64; 2]>,

    /// Fill color as a hex string.
    pub fill_color: String,

    #[serde(default)]
    pub animation: ShapeAnimation,
}

/// A text block with wrapping, alignment, and styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    #[serde(flatten)]
    pub visual: VisualCommon,

    /// Key of the element this caption is attached to; `None` means the
    /// text stands alone. Attached text offsets its start by the parent's.
    #[serde(default)]
    pub parent_key: Option<String>,

    pub text: String,

    pub text_color: String,

    /// Font size in pixels; also the first line's baseline offset.
    pub font_size: f64,

    /// Filesystem path of the font file to rasterize with.
    #[serde(default)]
    pub font_path: String,

    /// Display name of the font family.
    #[serde(default)]
    pub font_name: String,

    #[serde(default)]
    pub letter_spacing: f64,

    #[serde(default)]
    pub align: TextAlign,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    #[serde(default)]
    pub outline: TextOutline,

    #[serde(default)]
    pub background: TextBackground,

    /// Wrap width; zero falls back to the element width.
    #[serde(default)]
    pub width_inner: f64,

    #[serde(default)]
    pub animation: ElementAnimation,
}

/// An audio clip; contributes no pixels, only export audio mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioElement {
    #[serde(flatten)]
    pub common: ElementCommon,

    pub trim: TrimRange,

    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

/// One item placed on the timeline, tagged on `filetype`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filetype", rename_all = "lowercase")]
pub enum TimelineElement {
    Video(VideoElement),
    Image(ImageElement),
    Gif(GifElement),
    Shape(ShapeElement),
    Text(TextElement),
    Audio(AudioElement),
}

impl TimelineElement {
    pub fn filetype(&self) -> FileType {
        match self {
            TimelineElement::Video(_) => FileType::Video,
            TimelineElement::Image(_) => FileType::Image,
            TimelineElement::Gif(_) => FileType::Gif,
            TimelineElement::Shape(_) => FileType::Shape,
            TimelineElement::Text(_) => FileType::Text,
            TimelineElement::Audio(_) => FileType::Audio,
        }
    }

    pub fn common(&self) -> &ElementCommon {
        match self {
            TimelineElement::Video(e) => &e.common,
            TimelineElement::Image(e) => &e.common,
            TimelineElement::Gif(e) => &e.common,
            TimelineElement::Shape(e) => &e.common,
            TimelineElement::Text(e) => &e.common,
            TimelineElement::Audio(e) => &e.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut ElementCommon {
        match self {
            TimelineElement::Video(e) => &mut e.common,
            TimelineElement::Image(e) => &mut e.common,
            TimelineElement::Gif(e) => &mut e.common,
            TimelineElement::Shape(e) => &mut e.common,
            TimelineElement::Text(e) => &mut e.common,
            TimelineElement::Audio(e) => &mut e.common,
        }
    }

    /// Visual placement fields; `None` for audio.
    pub fn visual(&self) -> Option<&VisualCommon> {
        match self {
            TimelineElement::Video(e) => Some(&e.visual),
            TimelineElement::Image(e) => Some(&e.visual),
            TimelineElement::Gif(e) => Some(&e.visual),
            TimelineElement::Shape(e) => Some(&e.visual),
            TimelineElement::Text(e) => Some(&e.visual),
            TimelineElement::Audio(_) => None,
        }
    }

    pub fn visual_mut(&mut self) -> Option<&mut VisualCommon> {
        match self {
            TimelineElement::Video(e) => Some(&mut e.visual),
            TimelineElement::Image(e) => Some(&mut e.visual),
            TimelineElement::Gif(e) => Some(&mut e.visual),
            TimelineElement::Shape(e) => Some(&mut e.visual),
            TimelineElement::Text(e) => Some(&mut e.visual),
            TimelineElement::Audio(_) => None,
        }
    }

    pub fn key(&self) -> &str {
        &self.common().key
    }

    pub fn priority(&self) -> i32 {
        self.common().priority
    }

    pub fn start_time(&self) -> f64 {
        self.common().start_time
    }

    pub fn duration(&self) -> f64 {
        self.common().duration
    }

    pub fn local_path(&self) -> &str {
        &self.common().local_path
    }

    /// Playback-rate multiplier; 1.0 for static kinds.
    pub fn speed(&self) -> f64 {
        match self {
            TimelineElement::Video(e) => e.speed,
            TimelineElement::Audio(e) => e.speed,
            _ => 1.0,
        }
    }

    /// Source trim range; `None` for static kinds.
    pub fn trim(&self) -> Option<&TrimRange> {
        match self {
            TimelineElement::Video(e) => Some(&e.trim),
            TimelineElement::Audio(e) => Some(&e.trim),
            _ => None,
        }
    }

    /// Animation channel set; `None` for gif, shape, and audio.
    pub fn animation(&self) -> Option<&ElementAnimation> {
        match self {
            TimelineElement::Video(e) => Some(&e.animation),
            TimelineElement::Image(e) => Some(&e.animation),
            TimelineElement::Text(e) => Some(&e.animation),
            _ => None,
        }
    }

    pub fn animation_mut(&mut self) -> Option<&mut ElementAnimation> {
        match self {
            TimelineElement::Video(e) => Some(&mut e.animation),
            TimelineElement::Image(e) => Some(&mut e.animation),
            TimelineElement::Text(e) => Some(&mut e.animation),
            _ => None,
        }
    }

    /// On-timeline span in milliseconds: dynamic kinds divide their content
    /// duration by playback speed, static kinds show it unchanged.
    pub fn visible_duration(&self) -> f64 {
        let duration = self.duration();
        if self.filetype().is_dynamic() {
            let speed = self.speed();
            if speed > 0.0 {
                return duration / speed;
            }
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(key: &str, start: f64, duration: f64) -> ElementCommon {
        ElementCommon {
            key: key.to_string(),
            priority: 1,
            start_time: start,
            duration,
            location: Point::new(0.0, 0.0),
            local_path: String::new(),
            timeline_color: String::new(),
        }
    }

    fn sample_image(key: &str) -> TimelineElement {
        TimelineElement::Image(ImageElement {
            common: ElementCommon {
                local_path: "/tmp/a.png".to_string(),
                ..common(key, 0.0, 1000.0)
            },
            visual: VisualCommon::sized(640.0, 480.0),
            animation: ElementAnimation::default(),
        })
    }

    #[test]
    fn test_filetype_tag_round_trip() {
        let element = sample_image("img-1");
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["filetype"], "image");
        assert_eq!(json["key"], "img-1");
        assert_eq!(json["width"], 640.0);

        let parsed: TimelineElement = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, element);
    }

    #[test]
    fn test_video_deserialization_defaults_optional_fields() {
        let json = serde_json::json!({
            "filetype": "video",
            "key": "v1",
            "priority": 2,
            "start_time": 0.0,
            "duration": 4000.0,
            "location": { "x": 0.0, "y": 0.0 },
            "width": 1280.0,
            "height": 720.0,
            "ratio": 1.777,
            "opacity": 100.0,
            "rotation": 0.0,
            "trim": { "start_time": 0.0, "end_time": 4000.0 }
        });

        let parsed: TimelineElement = serde_json::from_value(json).unwrap();
        let TimelineElement::Video(video) = parsed else {
            panic!("expected video variant");
        };
        assert_eq!(video.speed, 1.0);
        assert!(!video.is_exist_audio);
        assert!(!video.filter.enable);
        assert!(!video.animation.opacity.is_activate);
    }

    #[test]
    fn test_visible_duration_scales_with_speed() {
        let video = TimelineElement::Video(VideoElement {
            common: common("v", 0.0, 4000.0),
            visual: VisualCommon::sized(1280.0, 720.0),
            trim: TrimRange {
                start_time: 0.0,
                end_time: 4000.0,
            },
            speed: 2.0,
            is_exist_audio: false,
            source_size: SourceSize::default(),
            filter: FilterChain::default(),
            animation: ElementAnimation::default(),
        });
        assert_eq!(video.visible_duration(), 2000.0);

        let image = sample_image("i");
        assert_eq!(image.visible_duration(), 1000.0);
    }

    #[test]
    fn test_visible_duration_guards_zero_speed() {
        let audio = TimelineElement::Audio(AudioElement {
            common: common("a", 0.0, 3000.0),
            trim: TrimRange {
                start_time: 0.0,
                end_time: 3000.0,
            },
            speed: 0.0,
        });
        assert_eq!(audio.visible_duration(), 3000.0);
    }

    #[test]
    fn test_audio_has_no_visual() {
        let audio = TimelineElement::Audio(AudioElement {
            common: common("a", 0.0, 1000.0),
            trim: TrimRange::default(),
            speed: 1.0,
        });
        assert!(audio.visual().is_none());
        assert!(!audio.filetype().is_visual());
        assert!(audio.filetype().is_dynamic());
    }
}
