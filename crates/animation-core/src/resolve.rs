//! Per-frame property resolution.
//!
//! Combines an element's base placement with its animation channels into the
//! effective draw properties at one cursor instant. Channel semantics:
//!
//! - `position` reads the baked tables without consulting `is_activate`
//!   (an empty table falls through to the authored location, so inactive
//!   channels still resolve to the base placement).
//! - `opacity` applies only when active; sample values are 0..100 and
//!   multiply into the element's base opacity.
//! - `scale` applies only when active; the editor bakes around a baseline
//!   sample value of 10, so the resolved factor is `value / 10`.
//! - `rotation` applies only when active; sample values are degrees and
//!   replace the base rotation.

use serde::Serialize;

use montage_timeline_model::{ElementAnimation, ShapeAnimation, TimelineElement};

use crate::evaluate::evaluate_channel;

/// Neutral opacity sample: multiplies the base by 1.
const OPACITY_BASELINE: f64 = 100.0;

/// Neutral scale sample: the editor writes 10 for "authored size".
const SCALE_BASELINE: f64 = 10.0;

/// Effective draw properties of one element at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedProps {
    /// Top-left x in source-resolution units.
    pub x: f64,

    /// Top-left y in source-resolution units.
    pub y: f64,

    /// Effective opacity, 0..100.
    pub opacity: f64,

    /// Size multiplier; 1.0 draws at the authored width/height.
    pub scale: f64,

    /// Rotation about the element center, degrees.
    pub rotation: f64,
}

impl ResolvedProps {
    /// Alpha factor in 0..1 for pixel blending.
    pub fn alpha(&self) -> f64 {
        (self.opacity / 100.0).clamp(0.0, 1.0)
    }
}

/// Resolve an element's draw properties at the timeline cursor.
///
/// `start_time` is the element's effective start (parent-adjusted for
/// attached text); pass `Timeline::effective_start`. Pure function; the
/// compositor calls it once per visible element per frame.
pub fn resolve_props(element: &TimelineElement, start_time: f64, cursor_ms: f64) -> ResolvedProps {
    let location = element.common().location;
    let (base_opacity, base_rotation) = match element.visual() {
        Some(visual) => (visual.opacity, visual.rotation),
        None => (100.0, 0.0),
    };

    let mut props = ResolvedProps {
        x: location.x,
        y: location.y,
        opacity: base_opacity,
        scale: 1.0,
        rotation: base_rotation,
    };

    match element {
        TimelineElement::Video(e) => {
            apply_element_channels(&mut props, &e.animation, start_time, cursor_ms)
        }
        TimelineElement::Image(e) => {
            apply_element_channels(&mut props, &e.animation, start_time, cursor_ms)
        }
        TimelineElement::Text(e) => {
            apply_element_channels(&mut props, &e.animation, start_time, cursor_ms)
        }
        TimelineElement::Shape(e) => {
            apply_shape_channels(&mut props, &e.animation, start_time, cursor_ms)
        }
        TimelineElement::Gif(_) | TimelineElement::Audio(_) => {}
    }

    props
}

fn apply_element_channels(
    props: &mut ResolvedProps,
    animation: &ElementAnimation,
    start_time: f64,
    cursor_ms: f64,
) {
    props.x = evaluate_channel(props.x, &animation.position.x_samples, start_time, cursor_ms);
    props.y = evaluate_channel(props.y, &animation.position.y_samples, start_time, cursor_ms);

    if animation.opacity.is_activate {
        let value = evaluate_channel(
            OPACITY_BASELINE,
            &animation.opacity.samples,
            start_time,
            cursor_ms,
        );
        props.opacity *= value / OPACITY_BASELINE;
    }

    if animation.scale.is_activate {
        let value = evaluate_channel(
            SCALE_BASELINE,
            &animation.scale.samples,
            start_time,
            cursor_ms,
        );
        props.scale = value / SCALE_BASELINE;
    }

    if animation.rotation.is_activate {
        props.rotation = evaluate_channel(
            props.rotation,
            &animation.rotation.samples,
            start_time,
            cursor_ms,
        );
    }
}

fn apply_shape_channels(
    props: &mut ResolvedProps,
    animation: &ShapeAnimation,
    start_time: f64,
    cursor_ms: f64,
) {
    if animation.opacity.is_activate {
        let value = evaluate_channel(
            OPACITY_BASELINE,
            &animation.opacity.samples,
            start_time,
            cursor_ms,
        );
        props.opacity *= value / OPACITY_BASELINE;
    }
}
