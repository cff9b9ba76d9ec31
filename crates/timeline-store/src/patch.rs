//! Typed element mutation.
//!
//! Editor mutations arrive as an `ElementPatch`: a bundle of optional field
//! writes checked against the target variant before anything is assigned, so
//! a rejected patch leaves the element untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use montage_timeline_model::{Point, TimelineElement, TrimRange};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown element: {id}")]
    UnknownElement { id: String },

    #[error("patch field '{field}' does not apply to {filetype} element '{id}'")]
    InvalidPatch {
        id: String,
        filetype: &'static str,
        field: &'static str,
    },

    #[error(
        "history rollback out of range: position {position}, delta {delta}, {len} snapshots"
    )]
    OutOfRangeHistory {
        position: usize,
        delta: i64,
        len: usize,
    },
}

/// Optional field writes applied to one element.
///
/// Placement fields apply to every variant; sizing and opacity to the visual
/// variants; text fields to text; trim and speed to video and audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ElementPatch {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub priority: Option<i32>,
    pub location: Option<Point>,
    pub timeline_color: Option<String>,

    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f64>,
    pub rotation: Option<f64>,

    pub text: Option<String>,
    pub text_color: Option<String>,
    pub font_size: Option<f64>,

    pub trim: Option<TrimRange>,
    pub speed: Option<f64>,
}

impl ElementPatch {
    /// Apply every present field to `element`. Applicability is checked
    /// before the first write; on error the element is unchanged.
    pub fn apply(&self, element: &mut TimelineElement) -> Result<(), StoreError> {
        self.check(element)?;

        let common = element.common_mut();
        if let Some(start_time) = self.start_time {
            common.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            common.duration = duration;
        }
        if let Some(priority) = self.priority {
            common.priority = priority;
        }
        if let Some(location) = self.location {
            common.location = location;
        }
        if let Some(timeline_color) = &self.timeline_color {
            common.timeline_color = timeline_color.clone();
        }

        if let Some(visual) = element.visual_mut() {
            if let Some(width) = self.width {
                visual.width = width;
            }
            if let Some(height) = self.height {
                visual.height = height;
            }
            if let Some(opacity) = self.opacity {
                visual.opacity = opacity;
            }
            if let Some(rotation) = self.rotation {
                visual.rotation = rotation;
            }
        }

        if let TimelineElement::Text(text) = element {
            if let Some(content) = &self.text {
                text.text = content.clone();
            }
            if let Some(text_color) = &self.text_color {
                text.text_color = text_color.clone();
            }
            if let Some(font_size) = self.font_size {
                text.font_size = font_size;
            }
        }

        match element {
            TimelineElement::Video(video) => {
                if let Some(trim) = self.trim {
                    video.trim = trim;
                }
                if let Some(speed) = self.speed {
                    video.speed = speed;
                }
            }
            TimelineElement::Audio(audio) => {
                if let Some(trim) = self.trim {
                    audio.trim = trim;
                }
                if let Some(speed) = self.speed {
                    audio.speed = speed;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn check(&self, element: &TimelineElement) -> Result<(), StoreError> {
        let reject = |field: &'static str| StoreError::InvalidPatch {
            id: element.key().to_string(),
            filetype: element.filetype().as_str(),
            field,
        };

        if element.visual().is_none() {
            if self.width.is_some() || self.height.is_some() {
                return Err(reject("width/height"));
            }
            if self.opacity.is_some() {
                return Err(reject("opacity"));
            }
            if self.rotation.is_some() {
                return Err(reject("rotation"));
            }
        }

        if !matches!(element, TimelineElement::Text(_))
            && (self.text.is_some() || self.text_color.is_some() || self.font_size.is_some())
        {
            return Err(reject("text"));
        }

        if !matches!(
            element,
            TimelineElement::Video(_) | TimelineElement::Audio(_)
        ) {
            if self.trim.is_some() {
                return Err(reject("trim"));
            }
            if self.speed.is_some() {
                return Err(reject("speed"));
            }
        }

        Ok(())
    }
}
