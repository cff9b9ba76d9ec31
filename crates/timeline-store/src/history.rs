//! Bounded checkpoint history: a fixed-capacity ring of timeline snapshots.

use std::collections::VecDeque;

use tracing::debug;

use montage_timeline_model::Timeline;

use crate::StoreError;

/// Maximum number of retained snapshots.
pub const HISTORY_CAPACITY: usize = 10;

/// A ring of full timeline snapshots plus a cursor into the sequence.
///
/// Checkpoints append at the back and evict from the front once the ring is
/// full (FIFO). Rolling back moves the cursor by a signed delta; out-of-range
/// deltas fail without touching any state.
#[derive(Debug, Clone, Default)]
pub struct HistoryRing {
    snapshots: VecDeque<Timeline>,
    position: usize,
}

impl HistoryRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor into the snapshot sequence; meaningless while empty.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Append a snapshot, evicting the oldest once over capacity. The cursor
    /// always lands on the new snapshot.
    pub fn checkpoint(&mut self, snapshot: Timeline) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.pop_front();
            debug!(len = self.snapshots.len(), "evicted oldest checkpoint");
        }
        self.position = self.snapshots.len() - 1;
    }

    /// Whether `rollback(delta)` would succeed.
    pub fn can_rollback(&self, delta: i64) -> bool {
        let target = self.position as i64 + delta;
        target >= 0 && (target as usize) < self.snapshots.len()
    }

    /// Move the cursor by `delta` and return the snapshot it lands on.
    pub fn rollback(&mut self, delta: i64) -> Result<&Timeline, StoreError> {
        let target = self.position as i64 + delta;
        if target < 0 || target as usize >= self.snapshots.len() {
            return Err(StoreError::OutOfRangeHistory {
                position: self.position,
                delta,
                len: self.snapshots.len(),
            });
        }
        self.position = target as usize;
        Ok(&self.snapshots[self.position])
    }
}
