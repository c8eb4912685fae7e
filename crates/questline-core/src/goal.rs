//! Clamped progress arithmetic for collaboration goals.
//!
//! Goal updates are append-only signed deltas; the cached progress value
//! is a clamped running sum. The clamp is applied to the sum, never to
//! the stored deltas -- the history stays raw while the display value
//! stays inside [0, target].

/// Apply a signed delta to a progress value, clamping to [0, target].
///
/// A non-positive target clamps everything to zero.
pub fn clamp_progress(previous: i64, delta: i64, target_value: i64) -> i64 {
    previous
        .saturating_add(delta)
        .clamp(0, target_value.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overshoot_clamps_to_target() {
        // 90 + 50 against a target of 100 yields 100, not 140.
        assert_eq!(clamp_progress(90, 50, 100), 100);
    }

    #[test]
    fn undershoot_clamps_to_zero() {
        // 10 - 200 yields 0, never negative.
        assert_eq!(clamp_progress(10, -200, 100), 0);
    }

    #[test]
    fn in_range_deltas_apply_exactly() {
        assert_eq!(clamp_progress(40, 25, 100), 65);
        assert_eq!(clamp_progress(40, -15, 100), 25);
    }

    #[test]
    fn zero_target_pins_progress_at_zero() {
        assert_eq!(clamp_progress(0, 10, 0), 0);
    }

    #[test]
    fn saturating_addition_never_wraps() {
        assert_eq!(clamp_progress(i64::MAX, i64::MAX, 100), 100);
        assert_eq!(clamp_progress(i64::MIN, i64::MIN, 100), 0);
    }
}
