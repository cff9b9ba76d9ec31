//! Animation channel and keyframe types.
//!
//! Each animatable element carries up to four independently-activatable
//! channels (position, opacity, scale, rotation). A channel stores two
//! representations of the same motion:
//!
//! - **Declared keyframes** (`keyframes`): sparse control points with a
//!   curve kind and bezier handles, edited by the user.
//! - **Sample table** (`samples`): dense `[elapsed_ms, value]` pairs baked
//!   from the declared keyframes, read by the runtime evaluator.
//!
//! The evaluator performs a nearest-sample lookup over the table; the curve
//! kind and handles are consumed only when the table is (re)baked.

use serde::{Deserialize, Serialize};

/// Dense time/value pairs read by the evaluator.
///
/// Times are milliseconds relative to the owning element's start and are
/// monotonically non-decreasing.
pub type SampleTable = Vec<[f64; 2]>;

/// Curve kind of a declared keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyframeKind {
    /// Cubic bezier segment shaped by the `cs`/`ce` handles.
    #[default]
    Cubic,
    /// Straight segment; handles sit on the chord.
    Linear,
}

/// A declared keyframe: anchor point plus incoming/outgoing bezier handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Curve kind of the segment leaving this keyframe.
    #[serde(rename = "type")]
    pub kind: KeyframeKind,

    /// Anchor point: `[time_ms, value]`.
    pub p: [f64; 2],

    /// Incoming control handle (control-start of the segment ending here).
    pub cs: [f64; 2],

    /// Outgoing control handle (control-end of the segment starting here).
    pub ce: [f64; 2],
}

impl Keyframe {
    /// A cubic keyframe with handles offset ±100 ms from the anchor,
    /// matching the editor's default handle placement.
    pub fn cubic(time_ms: f64, value: f64) -> Self {
        Self {
            kind: KeyframeKind::Cubic,
            p: [time_ms, value],
            cs: [time_ms - 100.0, value],
            ce: [time_ms + 100.0, value],
        }
    }

    /// A linear keyframe; handles are collapsed onto the anchor and get
    /// projected onto the chord when the table is baked.
    pub fn linear(time_ms: f64, value: f64) -> Self {
        Self {
            kind: KeyframeKind::Linear,
            p: [time_ms, value],
            cs: [time_ms, value],
            ce: [time_ms, value],
        }
    }

    pub fn time(&self) -> f64 {
        self.p[0]
    }

    pub fn value(&self) -> f64 {
        self.p[1]
    }
}

/// A single-value animation channel (opacity, scale, rotation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnimationChannel {
    /// Whether the channel participates in property resolution.
    pub is_activate: bool,

    /// Declared keyframes, sorted by anchor time.
    pub keyframes: Vec<Keyframe>,

    /// Baked sample table read by the evaluator.
    pub samples: SampleTable,
}

impl AnimationChannel {
    /// An active channel with a prebaked sample table (mostly for tests
    /// and presets).
    pub fn from_samples(samples: SampleTable) -> Self {
        Self {
            is_activate: true,
            keyframes: Vec::new(),
            samples,
        }
    }
}

/// The position channel animates x and y as two independent value tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PositionChannel {
    pub is_activate: bool,

    /// Declared keyframes for the x axis.
    pub x_keyframes: Vec<Keyframe>,

    /// Declared keyframes for the y axis.
    pub y_keyframes: Vec<Keyframe>,

    /// Baked sample table for the x axis.
    pub x_samples: SampleTable,

    /// Baked sample table for the y axis.
    pub y_samples: SampleTable,
}

/// The full channel set carried by video, image, and text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ElementAnimation {
    pub position: PositionChannel,
    pub opacity: AnimationChannel,
    pub scale: AnimationChannel,
    pub rotation: AnimationChannel,
}

/// Shapes animate opacity only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShapeAnimation {
    pub opacity: AnimationChannel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_keyframe_handle_offsets() {
        let kf = Keyframe::cubic(500.0, 40.0);
        assert_eq!(kf.p, [500.0, 40.0]);
        assert_eq!(kf.cs, [400.0, 40.0]);
        assert_eq!(kf.ce, [600.0, 40.0]);
    }

    #[test]
    fn test_keyframe_kind_serializes_as_type_field() {
        let kf = Keyframe::linear(0.0, 1.0);
        let json = serde_json::to_value(kf).unwrap();
        assert_eq!(json["type"], "linear");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_channel_defaults_are_inactive_and_empty() {
        let channel = AnimationChannel::default();
        assert!(!channel.is_activate);
        assert!(channel.keyframes.is_empty());
        assert!(channel.samples.is_empty());
    }

    #[test]
    fn test_element_animation_deserializes_from_empty_object() {
        let animation: ElementAnimation = serde_json::from_str("{}").unwrap();
        assert!(!animation.position.is_activate);
        assert!(!animation.opacity.is_activate);
    }
}
