//! The live editor state and its mutation surface.

use tracing::debug;

use montage_timeline_model::{Timeline, TimelineElement};

use crate::history::HistoryRing;
use crate::patch::{ElementPatch, StoreError};

/// What a mutation touched; delivered to every subscriber, once per mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    TimelineChanged,
    CursorMoved,
    RangeChanged,
    ScrollChanged,
    CanvasResized,
    PlaybackChanged,
    CursorTypeChanged,
    SelectionChanged,
    HistoryChanged,
}

/// Tool mode of the timeline cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorType {
    #[default]
    Pointer,
    Text,
    Shape,
    LockKeyboard,
}

/// Playback and tool-mode flags read by the preview driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub is_play: bool,
    pub cursor_type: CursorType,
}

/// Handle returned by `subscribe`, usable to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(usize);

type Subscriber = Box<dyn FnMut(StoreEvent) + Send>;

/// Owns the live timeline plus all editor-session state: zoom, scroll,
/// cursor, playback flags, selection, and the checkpoint history.
///
/// Every mutation is synchronous and invokes each subscriber exactly once,
/// in call order, before the mutating call returns. Readers take snapshots
/// (`&Timeline`); nothing outside this type writes the timeline.
pub struct TimelineStore {
    timeline: Timeline,
    range: f64,
    scroll: f64,
    cursor: f64,
    canvas_width: f64,
    control: ControlState,
    history: HistoryRing,
    selected_element_id: Option<String>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: usize,
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self {
            timeline: Timeline::new(),
            range: 0.9,
            scroll: 0.0,
            cursor: 0.0,
            canvas_width: 500.0,
            control: ControlState::default(),
            history: HistoryRing::new(),
            selected_element_id: None,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeline(timeline: Timeline) -> Self {
        Self {
            timeline,
            ..Self::default()
        }
    }

    // ---- read access -----------------------------------------------------

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn control(&self) -> ControlState {
        self.control
    }

    pub fn is_play(&self) -> bool {
        self.control.is_play
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.selected_element_id.as_deref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_position(&self) -> usize {
        self.history.position()
    }

    pub fn can_rollback(&self, delta: i64) -> bool {
        self.history.can_rollback(delta)
    }

    // ---- subscriptions ---------------------------------------------------

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(StoreEvent) + Send + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(existing, _)| *existing != id);
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    // ---- timeline mutations ----------------------------------------------

    /// Insert or overwrite one element under `key`. Overlapping time ranges
    /// are legitimate (stacked by priority), so no validation happens here.
    pub fn add_timeline(&mut self, key: impl Into<String>, mut element: TimelineElement) {
        let key = key.into();
        element.common_mut().key = key.clone();
        self.timeline.insert(element);
        debug!(key, len = self.timeline.len(), "element added");
        self.notify(StoreEvent::TimelineChanged);
    }

    /// Delete an element; a miss is a no-op but still counts as a mutation.
    pub fn remove_timeline(&mut self, id: &str) {
        if self.timeline.remove(id).is_some() {
            debug!(key = id, "element removed");
        }
        if self.selected_element_id.as_deref() == Some(id) {
            self.selected_element_id = None;
        }
        self.notify(StoreEvent::TimelineChanged);
    }

    /// Replace the whole map (project load, preset insertion, undo/redo).
    pub fn patch_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.notify(StoreEvent::TimelineChanged);
    }

    /// Empty the map.
    pub fn clear_timeline(&mut self) {
        self.timeline = Timeline::new();
        self.selected_element_id = None;
        self.notify(StoreEvent::TimelineChanged);
    }

    /// Apply a typed patch to one element. A failed patch mutates nothing
    /// and notifies nobody.
    pub fn update_timeline(&mut self, id: &str, patch: &ElementPatch) -> Result<(), StoreError> {
        let element = self
            .timeline
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownElement { id: id.to_string() })?;
        patch.apply(element)?;
        self.notify(StoreEvent::TimelineChanged);
        Ok(())
    }

    // ---- history ---------------------------------------------------------

    /// Snapshot the current timeline into the checkpoint ring.
    pub fn check_point_timeline(&mut self) {
        self.history.checkpoint(self.timeline.clone());
        debug!(
            len = self.history.len(),
            position = self.history.position(),
            "checkpoint"
        );
        self.notify(StoreEvent::HistoryChanged);
    }

    /// Move through the checkpoint ring by `delta` and restore that
    /// snapshot. Out-of-range deltas fail and leave everything unchanged.
    pub fn rollback_timeline_from_check_point(&mut self, delta: i64) -> Result<(), StoreError> {
        let snapshot = self.history.rollback(delta)?.clone();
        self.timeline = snapshot;
        self.notify(StoreEvent::TimelineChanged);
        Ok(())
    }

    // ---- cursor / viewport -----------------------------------------------

    /// Move the playback cursor. No clamping to the timeline's span happens
    /// at this layer.
    pub fn set_cursor(&mut self, cursor_ms: f64) {
        self.cursor = cursor_ms;
        self.notify(StoreEvent::CursorMoved);
    }

    pub fn increase_cursor(&mut self, delta_ms: f64) {
        self.cursor += delta_ms;
        self.notify(StoreEvent::CursorMoved);
    }

    pub fn decrease_cursor(&mut self, delta_ms: f64) {
        self.cursor -= delta_ms;
        self.notify(StoreEvent::CursorMoved);
    }

    /// Change the zoom factor, auto-scrolling so the cursor stays centered
    /// in the visible canvas.
    pub fn set_range(&mut self, range: f64) {
        self.range = range;
        self.scroll =
            ((self.cursor / 5.0) * (range / 4.0) - self.canvas_width / 2.0).max(0.0);
        self.notify(StoreEvent::RangeChanged);
    }

    pub fn set_scroll(&mut self, scroll_px: f64) {
        self.scroll = scroll_px;
        self.notify(StoreEvent::ScrollChanged);
    }

    pub fn set_canvas_width(&mut self, width_px: f64) {
        self.canvas_width = width_px;
        self.notify(StoreEvent::CanvasResized);
    }

    // ---- playback / tools / selection ------------------------------------

    pub fn set_play(&mut self, is_play: bool) {
        self.control.is_play = is_play;
        self.notify(StoreEvent::PlaybackChanged);
    }

    pub fn switch_play(&mut self) {
        self.control.is_play = !self.control.is_play;
        self.notify(StoreEvent::PlaybackChanged);
    }

    pub fn set_cursor_type(&mut self, cursor_type: CursorType) {
        self.control.cursor_type = cursor_type;
        self.notify(StoreEvent::CursorTypeChanged);
    }

    pub fn set_selected(&mut self, id: Option<String>) {
        self.selected_element_id = id;
        self.notify(StoreEvent::SelectionChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use montage_timeline_model::{
        ElementAnimation, ElementCommon, ImageElement, Point, VisualCommon,
    };

    fn image(key: &str) -> TimelineElement {
        TimelineElement::Image(ImageElement {
            common: ElementCommon {
                key: key.to_string(),
                priority: 1,
                start_time: 0.0,
                duration: 1000.0,
                location: Point::new(0.0, 0.0),
                local_path: String::new(),
                timeline_color: String::new(),
            },
            visual: VisualCommon::sized(100.0, 100.0),
            animation: ElementAnimation::default(),
        })
    }

    #[test]
    fn test_defaults() {
        let store = TimelineStore::new();
        assert_eq!(store.range(), 0.9);
        assert_eq!(store.scroll(), 0.0);
        assert_eq!(store.cursor(), 0.0);
        assert_eq!(store.canvas_width(), 500.0);
        assert!(!store.is_play());
        assert_eq!(store.control().cursor_type, CursorType::Pointer);
        assert!(store.selected_element_id().is_none());
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn test_add_uses_given_key_and_overwrites() {
        let mut store = TimelineStore::new();
        store.add_timeline("clip", image("whatever"));
        assert_eq!(store.timeline().get("clip").unwrap().key(), "clip");

        let mut replacement = image("clip");
        replacement.common_mut().priority = 9;
        store.add_timeline("clip", replacement);
        assert_eq!(store.timeline().len(), 1);
        assert_eq!(store.timeline().get("clip").unwrap().priority(), 9);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = TimelineStore::new();
        store.add_timeline("a", image("a"));
        store.remove_timeline("nope");
        assert_eq!(store.timeline().len(), 1);
        store.remove_timeline("a");
        assert!(store.timeline().is_empty());
    }

    #[test]
    fn test_remove_clears_selection_of_removed_element() {
        let mut store = TimelineStore::new();
        store.add_timeline("a", image("a"));
        store.set_selected(Some("a".to_string()));
        store.remove_timeline("a");
        assert!(store.selected_element_id().is_none());
    }

    #[test]
    fn test_update_unknown_element_fails_silently_for_subscribers() {
        let mut store = TimelineStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| sink.lock().unwrap().push(event));

        let err = store
            .update_timeline("ghost", &ElementPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownElement { .. }));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_update_applies_patch() {
        let mut store = TimelineStore::new();
        store.add_timeline("a", image("a"));
        let patch = ElementPatch {
            start_time: Some(750.0),
            ..ElementPatch::default()
        };
        store.update_timeline("a", &patch).unwrap();
        assert_eq!(store.timeline().get("a").unwrap().start_time(), 750.0);
    }

    #[test]
    fn test_eleven_checkpoints_keep_ten() {
        let mut store = TimelineStore::new();
        for i in 0..11 {
            store.add_timeline(format!("k{i}"), image("x"));
            store.check_point_timeline();
        }
        assert_eq!(store.history_len(), 10);

        // Walking to the oldest surviving snapshot lands on checkpoint #2,
        // which already contained two elements.
        store.rollback_timeline_from_check_point(-9).unwrap();
        assert_eq!(store.timeline().len(), 2);
        assert!(store.timeline().contains_key("k0"));
        assert!(store.timeline().contains_key("k1"));
    }

    #[test]
    fn test_rollback_round_trip() {
        let mut store = TimelineStore::new();
        store.add_timeline("a", image("a"));
        store.check_point_timeline();
        store.add_timeline("b", image("b"));
        store.check_point_timeline();

        store.rollback_timeline_from_check_point(-1).unwrap();
        assert_eq!(store.timeline().len(), 1);

        store.rollback_timeline_from_check_point(1).unwrap();
        assert_eq!(store.timeline().len(), 2);
    }

    #[test]
    fn test_out_of_range_rollback_leaves_timeline() {
        let mut store = TimelineStore::new();
        store.add_timeline("a", image("a"));
        store.check_point_timeline();
        store.add_timeline("b", image("b"));

        let err = store.rollback_timeline_from_check_point(-5).unwrap_err();
        assert!(matches!(err, StoreError::OutOfRangeHistory { .. }));
        // The un-checkpointed working state survives.
        assert_eq!(store.timeline().len(), 2);
    }

    #[test]
    fn test_set_range_centers_cursor() {
        let mut store = TimelineStore::new();
        store.set_cursor(5000.0);
        store.set_range(4.0);
        // 5000 ms at range 4 is 1000 px; centering subtracts half the canvas.
        assert_eq!(store.scroll(), 750.0);

        store.set_cursor(100.0);
        store.set_range(4.0);
        assert_eq!(store.scroll(), 0.0);
    }

    #[test]
    fn test_one_notification_per_mutation_in_order() {
        let mut store = TimelineStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| sink.lock().unwrap().push(event));

        store.add_timeline("a", image("a"));
        store.set_cursor(100.0);
        store.switch_play();
        store.check_point_timeline();
        store.remove_timeline("a");

        let seen = events.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                StoreEvent::TimelineChanged,
                StoreEvent::CursorMoved,
                StoreEvent::PlaybackChanged,
                StoreEvent::HistoryChanged,
                StoreEvent::TimelineChanged,
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut store = TimelineStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = store.subscribe(move |event| sink.lock().unwrap().push(event));

        store.set_cursor(1.0);
        store.unsubscribe(id);
        store.set_cursor(2.0);

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_switch_play_toggles() {
        let mut store = TimelineStore::new();
        store.switch_play();
        assert!(store.is_play());
        store.switch_play();
        assert!(!store.is_play());
    }

    #[test]
    fn test_cursor_moves_unclamped() {
        let mut store = TimelineStore::new();
        store.increase_cursor(500.0);
        store.decrease_cursor(800.0);
        assert_eq!(store.cursor(), -300.0);
    }
}
