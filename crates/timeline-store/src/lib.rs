//! Montage Timeline Store
//!
//! The single owner of the live editing session:
//! - **Store:** timeline map, cursor, zoom/scroll, playback flags, selection
//! - **Patches:** typed per-element mutation with applicability checking
//! - **History:** a fixed-capacity ring of full timeline checkpoints
//!
//! All writes funnel through `TimelineStore`; readers receive snapshots.
//! Subscribers are invoked synchronously, once per mutation, in call order.

pub mod history;
pub mod patch;
pub mod store;

pub use history::{HistoryRing, HISTORY_CAPACITY};
pub use patch::{ElementPatch, StoreError};
pub use store::{CursorType, StoreEvent, SubscriberId, TimelineStore};
