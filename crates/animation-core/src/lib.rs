//! Montage Animation Core
//!
//! Turns declared keyframes into the values the compositor draws with:
//! - **Baking:** flatten bezier keyframe lists into dense sample tables
//! - **Evaluation:** nearest-sample lookup of a channel at a cursor time
//! - **Resolution:** combine base placement with all four channels into
//!   effective draw properties
//!
//! This crate is pure computation — no I/O, no surfaces. All inputs are
//! data; all outputs are data.

pub mod bake;
pub mod evaluate;
pub mod resolve;

pub use bake::{bake_channel, insert_keyframe, rebake_element, rebake_shape};
pub use evaluate::evaluate_channel;
pub use resolve::{resolve_props, ResolvedProps};
