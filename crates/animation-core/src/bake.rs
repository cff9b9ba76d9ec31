//! Sample-table baking: declared keyframes to evaluator tables.
//!
//! The editor manipulates sparse keyframes with bezier handles; the runtime
//! evaluator reads a dense `[elapsed_ms, value]` table. Baking walks each
//! adjacent keyframe pair and samples the parametric cubic at one point per
//! 60 Hz frame, so the nearest-sample lookup lands within half a frame of
//! the declared curve.

use tracing::debug;

use montage_timeline_model::{
    AnimationChannel, ElementAnimation, Keyframe, KeyframeKind, PositionChannel, SampleTable,
    ShapeAnimation,
};

/// Sampling interval of the baked table, one sample per 60 Hz frame.
const BAKE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Flatten a declared keyframe list into a sample table.
///
/// Each adjacent pair `(a, b)` contributes `round(interval / 16.6) + 1`
/// samples (minimum 2), sampled at `t = k / steps` so the endpoints land
/// exactly on the anchors. Segment joins produce a duplicate time; the later
/// sample wins, keeping the table times strictly non-decreasing.
pub fn bake_channel(keyframes: &[Keyframe]) -> SampleTable {
    let mut samples = SampleTable::new();
    match keyframes {
        [] => return samples,
        [only] => {
            samples.push([only.time(), only.value()]);
            return samples;
        }
        _ => {}
    }

    for pair in keyframes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let interval = b.time() - a.time();
        let steps = ((interval / BAKE_FRAME_MS).round() as u32).max(1);
        let (handle_out, handle_in) = segment_handles(a, b);

        for k in 0..=steps {
            let t = f64::from(k) / f64::from(steps);
            push_sample(&mut samples, cubic_point(a.p, handle_out, handle_in, b.p, t));
        }
    }
    samples
}

/// Insert a new cubic keyframe in time order, default handles ±100 ms.
pub fn insert_keyframe(keyframes: &mut Vec<Keyframe>, time_ms: f64, value: f64) {
    let index = keyframes.partition_point(|k| k.time() <= time_ms);
    keyframes.insert(index, Keyframe::cubic(time_ms, value));
}

/// Re-bake a single-value channel from its declared keyframes.
pub fn rebake_channel(channel: &mut AnimationChannel) {
    channel.samples = bake_channel(&channel.keyframes);
}

/// Re-bake both axes of a position channel.
pub fn rebake_position(channel: &mut PositionChannel) {
    channel.x_samples = bake_channel(&channel.x_keyframes);
    channel.y_samples = bake_channel(&channel.y_keyframes);
}

/// Re-bake every channel of an element's animation set.
pub fn rebake_element(animation: &mut ElementAnimation) {
    rebake_position(&mut animation.position);
    rebake_channel(&mut animation.opacity);
    rebake_channel(&mut animation.scale);
    rebake_channel(&mut animation.rotation);
}

/// Re-bake a shape's opacity channel.
pub fn rebake_shape(animation: &mut ShapeAnimation) {
    rebake_channel(&mut animation.opacity);
}

/// Bezier handles for the segment between `a` and `b`. A linear keyframe
/// projects its handle onto the chord at the 1/3 or 2/3 point, which reduces
/// the cubic to the straight line between the anchors.
fn segment_handles(a: &Keyframe, b: &Keyframe) -> ([f64; 2], [f64; 2]) {
    let handle_out = match a.kind {
        KeyframeKind::Linear => chord_point(a.p, b.p, 1.0 / 3.0),
        KeyframeKind::Cubic => a.ce,
    };
    let handle_in = match b.kind {
        KeyframeKind::Linear => chord_point(a.p, b.p, 2.0 / 3.0),
        KeyframeKind::Cubic => b.cs,
    };
    (handle_out, handle_in)
}

fn chord_point(a: [f64; 2], b: [f64; 2], t: f64) -> [f64; 2] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

/// Point on the cubic bezier through `p0 .. p3` at parameter `t`.
fn cubic_point(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], t: f64) -> [f64; 2] {
    let u = 1.0 - t;
    let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    [
        b0 * p0[0] + b1 * p1[0] + b2 * p2[0] + b3 * p3[0],
        b0 * p0[1] + b1 * p1[1] + b2 * p2[1] + b3 * p3[1],
    ]
}

/// Append a sample, keeping times non-decreasing. A sample that fails to
/// advance the clock (segment join, or an aggressive handle bending the time
/// curve backwards) overwrites the previous value instead of regressing.
fn push_sample(samples: &mut SampleTable, sample: [f64; 2]) {
    match samples.last_mut() {
        Some(last) if sample[0] <= last[0] => {
            if sample[0] < last[0] {
                debug!(
                    at = last[0],
                    regressed_to = sample[0],
                    "clamping non-monotonic bake sample"
                );
            }
            last[1] = sample[1];
        }
        _ => samples.push(sample),
    }
}
