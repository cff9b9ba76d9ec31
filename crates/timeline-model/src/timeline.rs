//! The timeline: an insertion-ordered map of elements keyed by element key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::TimelineElement;

/// All elements of a project, keyed by element key.
///
/// Insertion order is preserved so serialization round-trips stably; draw
/// order is decided by element priority, not map order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timeline {
    pub elements: IndexMap<String, TimelineElement>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TimelineElement> {
        self.elements.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TimelineElement> {
        self.elements.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    pub fn insert(&mut self, element: TimelineElement) -> Option<TimelineElement> {
        self.elements.insert(element.key().to_string(), element)
    }

    pub fn remove(&mut self, key: &str) -> Option<TimelineElement> {
        self.elements.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TimelineElement)> {
        self.elements.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &TimelineElement> {
        self.elements.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.elements.keys()
    }

    /// Effective timeline start of an element: attached text inherits its
    /// parent's start as an offset, everything else starts where placed.
    pub fn effective_start(&self, element: &TimelineElement) -> f64 {
        let mut start = element.start_time();
        if let TimelineElement::Text(text) = element {
            if let Some(parent_key) = &text.parent_key {
                if let Some(parent) = self.elements.get(parent_key) {
                    start += parent.start_time();
                }
            }
        }
        start
    }

    /// Whether `element` is on screen at `time_ms`. The window is half-open:
    /// an element is visible from its start up to, but not including, start
    /// plus its speed-adjusted span.
    pub fn is_visible_at(&self, element: &TimelineElement, time_ms: f64) -> bool {
        let start = self.effective_start(element);
        time_ms >= start && time_ms < start + element.visible_duration()
    }

    /// Elements visible at `time_ms`, in ascending priority so callers can
    /// draw in-order and later elements land on top.
    pub fn visible_at(&self, time_ms: f64) -> Vec<&TimelineElement> {
        let mut visible: Vec<&TimelineElement> = self
            .elements
            .values()
            .filter(|element| self.is_visible_at(element, time_ms))
            .collect();
        visible.sort_by_key(|element| element.priority());
        visible
    }

    /// End of the last visible element, in milliseconds; zero when empty.
    pub fn total_duration_ms(&self) -> f64 {
        self.elements
            .values()
            .map(|element| self.effective_start(element) + element.visible_duration())
            .fold(0.0, f64::max)
    }
}

impl FromIterator<TimelineElement> for Timeline {
    fn from_iter<I: IntoIterator<Item = TimelineElement>>(iter: I) -> Self {
        let mut timeline = Timeline::new();
        for element in iter {
            timeline.insert(element);
        }
        timeline
    }
}
