//! Montage Timeline Model
//!
//! Defines the core data contracts for Montage projects:
//! - **Elements:** Media, shape, and text items placed on the timeline
//! - **Animation:** Keyframe channels and their baked sample tables
//! - **Timeline:** The ordered element map with visibility queries
//! - **Options:** Render/export settings and frame math
//! - **Project:** On-disk project layout and load/save
//!
//! All element times are in milliseconds; placement coordinates are in
//! source-resolution units scaled at composite time to the output size.

pub mod animation;
pub mod element;
pub mod options;
pub mod project;
pub mod time;
pub mod timeline;

pub use animation::*;
pub use element::*;
pub use options::*;
pub use project::*;
pub use timeline::*;
