//! Conversions between timeline milliseconds and editor-track pixels.
//!
//! The editor draws the timeline at a zoom factor (`range`). At range 4 one
//! timeline pixel covers 5 ms, so 5000 ms spans 1000 px; other ranges scale
//! that linearly.

/// Convert a timeline instant to a track pixel offset at the given zoom.
/// Negative inputs clamp to zero.
pub fn milliseconds_to_px(ms: f64, range: f64) -> f64 {
    let px = (ms / 5.0) * (range / 4.0);
    px.round().max(0.0)
}

/// Convert a track pixel offset back to a timeline instant at the given zoom.
pub fn px_to_milliseconds(px: f64, range: f64) -> f64 {
    ((px * 5.0) / (range / 4.0)).round()
}
