//! Nearest-sample channel evaluation.
//!
//! The runtime evaluator never walks the bezier curve; it reads the baked
//! sample table and returns the value of the sample closest in time to the
//! cursor. The declared keyframes (kind, handles) exist for the baker and for
//! a future continuous evaluator, not for this lookup.

use montage_timeline_model::SampleTable;

/// Value of an animated property at the global timeline cursor.
///
/// Before the element starts the channel is inactive and `initial_value`
/// passes through untouched. From the element's start onward the table is
/// scanned for the entry nearest to the elapsed time (minimum absolute
/// difference; the earliest entry wins ties). An empty table also yields
/// `initial_value`.
///
/// Pure function of its inputs; safe to call once per property per frame.
pub fn evaluate_channel(
    initial_value: f64,
    samples: &SampleTable,
    start_time: f64,
    cursor_ms: f64,
) -> f64 {
    if cursor_ms < start_time {
        return initial_value;
    }
    nearest_sample(samples, cursor_ms - start_time).unwrap_or(initial_value)
}

/// The value of the sample whose time is nearest to `elapsed_ms`, or `None`
/// for an empty table.
fn nearest_sample(samples: &SampleTable, elapsed_ms: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for sample in samples {
        let distance = (sample[0] - elapsed_ms).abs();
        match best {
            Some((best_distance, _)) if distance >= best_distance => {}
            _ => best = Some((distance, sample[1])),
        }
    }
    best.map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_before_start_returns_initial() {
        let samples = vec![[0.0, 50.0], [100.0, 60.0]];
        assert_eq!(evaluate_channel(7.0, &samples, 1000.0, 500.0), 7.0);
    }

    #[test]
    fn test_before_start_with_empty_table_returns_initial() {
        assert_eq!(evaluate_channel(7.0, &SampleTable::new(), 1000.0, 500.0), 7.0);
    }

    #[test]
    fn test_empty_table_after_start_returns_initial() {
        assert_eq!(evaluate_channel(7.0, &SampleTable::new(), 1000.0, 1500.0), 7.0);
    }

    #[test]
    fn test_exact_sample_hit() {
        let samples = vec![[0.0, 10.0], [100.0, 20.0], [200.0, 30.0]];
        assert_eq!(evaluate_channel(0.0, &samples, 1000.0, 1100.0), 20.0);
    }

    #[test]
    fn test_nearest_wins_between_samples() {
        let samples = vec![[0.0, 10.0], [100.0, 20.0]];
        assert_eq!(evaluate_channel(0.0, &samples, 0.0, 49.0), 10.0);
        assert_eq!(evaluate_channel(0.0, &samples, 0.0, 51.0), 20.0);
    }

    #[test]
    fn test_tie_goes_to_earliest_sample() {
        let samples = vec![[0.0, 10.0], [100.0, 20.0]];
        assert_eq!(evaluate_channel(0.0, &samples, 0.0, 50.0), 10.0);
    }

    #[test]
    fn test_cursor_past_table_end_holds_last_value() {
        let samples = vec![[0.0, 10.0], [100.0, 20.0]];
        assert_eq!(evaluate_channel(0.0, &samples, 0.0, 9999.0), 20.0);
    }

    #[test]
    fn test_start_boundary_is_active() {
        let samples = vec![[0.0, 42.0]];
        assert_eq!(evaluate_channel(0.0, &samples, 1000.0, 1000.0), 42.0);
    }
}
