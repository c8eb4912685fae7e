//! The level calculator: a pure mapping from total XP to level terms.
//!
//! XP required to advance from level L to L+1 is `floor(100 * 1.5^(L-1))`.
//! The curve starts at 100 XP (level 1 to 2) and grows geometrically:
//! 100, 150, 225, 337, 506, ... Level thresholds are therefore cumulative
//! sums of per-level floors: level 2 begins at 100 total XP, level 3 at
//! 250, level 4 at 475.
//!
//! All math uses [`Decimal`] -- the 1.5 multiplier is exact in fixed-point
//! and the per-level floor is taken on the exact power, never on an
//! accumulated rounding error. This module is deterministic and free of
//! I/O; it is the single implementation behind both live XP grants and
//! display-only profile reads, so the two code paths cannot disagree.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use questline_types::LevelProgress;

/// XP required to advance from level 1 to level 2.
pub const BASE_LEVEL_XP: i64 = 100;

/// Geometric growth factor per level (exactly 1.5).
fn multiplier() -> Decimal {
    Decimal::new(15, 1)
}

/// XP required to advance from `level` to `level + 1`.
///
/// Returns `floor(100 * 1.5^(level-1))`. Level 0 is not a valid level;
/// it is treated as level 1. Saturates at [`i64::MAX`] once the exact
/// power exceeds [`Decimal`] range (far beyond any reachable level).
pub fn xp_for_level(level: u32) -> i64 {
    let mut exact = Decimal::from(BASE_LEVEL_XP);
    let mut l: u32 = 1;
    while l < level {
        match exact.checked_mul(multiplier()) {
            Some(next) => exact = next,
            None => return i64::MAX,
        }
        l = l.saturating_add(1);
    }
    exact.trunc().to_i64().unwrap_or(i64::MAX)
}

/// Total XP at which `level` first begins.
///
/// This is the sum of [`xp_for_level`] over all completed levels:
/// `cumulative_xp_for_level(1) == 0`, `cumulative_xp_for_level(2) == 100`,
/// `cumulative_xp_for_level(3) == 250`, `cumulative_xp_for_level(4) == 475`.
pub fn cumulative_xp_for_level(level: u32) -> i64 {
    let mut exact = Decimal::from(BASE_LEVEL_XP);
    let mut total: i64 = 0;
    let mut l: u32 = 1;
    while l < level {
        let need = exact.trunc().to_i64().unwrap_or(i64::MAX);
        total = total.saturating_add(need);
        match exact.checked_mul(multiplier()) {
            Some(next) => exact = next,
            None => return i64::MAX,
        }
        l = l.saturating_add(1);
    }
    total
}

/// Break a total XP value into (level, XP within the level, XP to next).
///
/// Walks levels upward accumulating per-level requirements until the
/// cumulative threshold would exceed `total_xp`. Negative inputs (which
/// the ledger clamps before they are ever stored) are treated as zero.
pub fn level_progress(total_xp: i64) -> LevelProgress {
    let total = total_xp.max(0);
    let mut level: u32 = 1;
    let mut consumed: i64 = 0;
    let mut exact = Decimal::from(BASE_LEVEL_XP);

    loop {
        let need = exact.trunc().to_i64().unwrap_or(i64::MAX);
        let reached = match consumed.checked_add(need) {
            Some(v) => v,
            // The next threshold is beyond i64 -- the walk is over.
            None => break,
        };
        if reached > total {
            let current_level_xp = total.saturating_sub(consumed);
            return LevelProgress {
                level,
                current_level_xp,
                xp_to_next_level: need.saturating_sub(current_level_xp),
            };
        }
        consumed = reached;
        level = level.saturating_add(1);
        match exact.checked_mul(multiplier()) {
            Some(next) => exact = next,
            None => break,
        }
    }

    LevelProgress {
        level,
        current_level_xp: total.saturating_sub(consumed),
        xp_to_next_level: i64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Per-level requirements
    // -----------------------------------------------------------------------

    #[test]
    fn per_level_requirements_follow_the_curve() {
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(2), 150);
        assert_eq!(xp_for_level(3), 225);
        // 337.5 floors to 337.
        assert_eq!(xp_for_level(4), 337);
        // 506.25 floors to 506.
        assert_eq!(xp_for_level(5), 506);
    }

    #[test]
    fn level_zero_treated_as_level_one() {
        assert_eq!(xp_for_level(0), 100);
    }

    // -----------------------------------------------------------------------
    // Cumulative thresholds
    // -----------------------------------------------------------------------

    #[test]
    fn cumulative_thresholds_match_spec_examples() {
        assert_eq!(cumulative_xp_for_level(1), 0);
        assert_eq!(cumulative_xp_for_level(2), 100);
        assert_eq!(cumulative_xp_for_level(3), 250);
        assert_eq!(cumulative_xp_for_level(4), 475);
    }

    /// Level/XP round trip: the cumulative threshold for level L is the
    /// first total at which `level_progress` reports level L.
    #[test]
    fn round_trip_between_thresholds_and_progress() {
        for level in 2..=20u32 {
            let threshold = cumulative_xp_for_level(level);
            assert_eq!(
                level_progress(threshold).level,
                level,
                "at threshold for level {level}"
            );
            assert_eq!(
                level_progress(threshold.saturating_sub(1)).level,
                level.saturating_sub(1),
                "one XP short of level {level}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Progress breakdown
    // -----------------------------------------------------------------------

    #[test]
    fn zero_xp_is_level_one() {
        let p = level_progress(0);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_level_xp, 0);
        assert_eq!(p.xp_to_next_level, 100);
    }

    #[test]
    fn ten_xp_stays_on_level_one() {
        let p = level_progress(10);
        assert_eq!(p.level, 1);
        assert_eq!(p.current_level_xp, 10);
        assert_eq!(p.xp_to_next_level, 90);
    }

    #[test]
    fn exactly_one_hundred_reaches_level_two() {
        let p = level_progress(100);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_level_xp, 0);
        assert_eq!(p.xp_to_next_level, 150);
    }

    /// The end-to-end scenario numbers: 105 total XP sits 5 XP into
    /// level 2 with 145 XP still needed.
    #[test]
    fn one_hundred_five_breakdown() {
        let p = level_progress(105);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_level_xp, 5);
        assert_eq!(p.xp_to_next_level, 145);
    }

    #[test]
    fn negative_xp_treated_as_zero() {
        assert_eq!(level_progress(-50), level_progress(0));
    }

    /// Level monotonicity: more XP never means a lower level.
    #[test]
    fn level_is_monotonic_in_total_xp() {
        let mut previous = 0u32;
        for total in (0..5_000i64).step_by(7) {
            let level = level_progress(total).level;
            assert!(level >= previous, "level dropped at total {total}");
            previous = level;
        }
    }

    #[test]
    fn huge_totals_do_not_panic() {
        let p = level_progress(i64::MAX);
        assert!(p.level > 1);
    }
}
