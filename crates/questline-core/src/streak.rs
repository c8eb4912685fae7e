//! The streak state machine, keyed on calendar days.
//!
//! A streak is the count of consecutive calendar days with at least one
//! qualifying activity (lesson completion, not page views). Day identity
//! comes from the platform's configured UTC offset, never from elapsed
//! hours: an activity at 23:59 followed by one at 00:01 the next day is
//! a continuation.
//!
//! The machine is pure -- the engine supplies the stored state and
//! today's date, and persists whatever comes back in the same database
//! transaction as any milestone XP grant.

use chrono::NaiveDate;

/// Streak milestones fall on positive multiples of this many days.
pub const STREAK_MILESTONE_DAYS: u32 = 7;

/// The stored streak state for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    /// Consecutive days counted so far.
    pub current: u32,
    /// Longest streak ever reached.
    pub longest: u32,
    /// Calendar day of the most recent qualifying activity.
    pub last_activity: Option<NaiveDate>,
}

/// Relationship between the last activity day and today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGap {
    /// No prior activity on record.
    First,
    /// Last activity was today; repeated calls are idempotent.
    SameDay,
    /// Last activity was exactly yesterday; the streak continues.
    Consecutive,
    /// Last activity was two or more days ago; the streak is broken.
    Broken,
}

/// Classify the gap between the last activity day and `today`.
///
/// A recorded day *after* today (clock skew between nodes) is treated as
/// [`DayGap::SameDay`] so that skew can never break or double-count a
/// streak.
pub fn classify_gap(last_activity: Option<NaiveDate>, today: NaiveDate) -> DayGap {
    match last_activity {
        None => DayGap::First,
        Some(last) if last >= today => DayGap::SameDay,
        Some(last) => match today.signed_duration_since(last).num_days() {
            1 => DayGap::Consecutive,
            _ => DayGap::Broken,
        },
    }
}

/// The result of advancing a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakAdvance {
    /// Streak length after the update.
    pub current: u32,
    /// Longest streak after the update.
    pub longest: u32,
    /// True only if `longest` increased in this update.
    pub is_new_record: bool,
    /// True if any stored field changed (false for same-day repeats).
    pub changed: bool,
    /// Set to the new streak length when it landed on a milestone
    /// (positive multiple of [`STREAK_MILESTONE_DAYS`]); the engine
    /// grants the milestone XP bonus exactly once per milestone hit.
    pub milestone: Option<u32>,
}

/// Advance the streak for an activity occurring on `today`.
pub fn advance(state: &StreakState, today: NaiveDate) -> StreakAdvance {
    let (current, changed) = match classify_gap(state.last_activity, today) {
        DayGap::SameDay => (state.current, false),
        DayGap::First | DayGap::Broken => (1, true),
        DayGap::Consecutive => (state.current.saturating_add(1), true),
    };

    let longest = state.longest.max(current);
    let is_new_record = longest > state.longest;

    let milestone = (changed && current > 0 && current.is_multiple_of(STREAK_MILESTONE_DAYS))
        .then_some(current);

    StreakAdvance {
        current,
        longest,
        is_new_record,
        changed,
        milestone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap_or_default()
    }

    fn state(current: u32, longest: u32, last: Option<NaiveDate>) -> StreakState {
        StreakState {
            current,
            longest,
            last_activity: last,
        }
    }

    #[test]
    fn first_activity_starts_at_one() {
        let out = advance(&state(0, 0, None), day("2026-03-10"));
        assert_eq!(out.current, 1);
        assert_eq!(out.longest, 1);
        assert!(out.is_new_record);
        assert!(out.changed);
        assert_eq!(out.milestone, None);
    }

    /// Same-day repeats are idempotent: calling twice within the same
    /// calendar day yields identical state both times.
    #[test]
    fn same_day_is_idempotent() {
        let today = day("2026-03-10");
        let first = advance(&state(0, 0, None), today);
        let next = state(first.current, first.longest, Some(today));
        let second = advance(&next, today);
        assert_eq!(second.current, first.current);
        assert_eq!(second.longest, first.longest);
        assert!(!second.changed);
        assert!(!second.is_new_record);
        assert_eq!(second.milestone, None);
    }

    #[test]
    fn yesterday_continues_the_streak() {
        let out = advance(&state(6, 6, Some(day("2026-03-09"))), day("2026-03-10"));
        assert_eq!(out.current, 7);
        assert_eq!(out.longest, 7);
        assert!(out.is_new_record);
        // 7 is a milestone: exactly one bonus grant.
        assert_eq!(out.milestone, Some(7));
    }

    #[test]
    fn three_day_gap_resets_to_one() {
        let out = advance(&state(5, 9, Some(day("2026-03-07"))), day("2026-03-10"));
        assert_eq!(out.current, 1);
        assert_eq!(out.longest, 9);
        assert!(!out.is_new_record);
        assert!(out.changed);
        assert_eq!(out.milestone, None);
    }

    #[test]
    fn two_day_gap_also_breaks() {
        let out = advance(&state(3, 3, Some(day("2026-03-08"))), day("2026-03-10"));
        assert_eq!(out.current, 1);
    }

    #[test]
    fn longest_streak_never_decreases() {
        let out = advance(&state(2, 14, Some(day("2026-03-09"))), day("2026-03-10"));
        assert_eq!(out.current, 3);
        assert_eq!(out.longest, 14);
        assert!(!out.is_new_record);
    }

    #[test]
    fn milestone_only_on_exact_multiples() {
        for (current, expect) in [(5u32, None), (6, Some(7)), (12, None), (13, Some(14))] {
            let out = advance(
                &state(current, 20, Some(day("2026-03-09"))),
                day("2026-03-10"),
            );
            assert_eq!(out.milestone, expect.filter(|_| out.changed));
        }
    }

    #[test]
    fn milestone_not_re_granted_on_same_day_repeat() {
        let today = day("2026-03-10");
        let out = advance(&state(7, 7, Some(today)), today);
        assert!(!out.changed);
        assert_eq!(out.milestone, None);
    }

    #[test]
    fn future_last_activity_is_treated_as_same_day() {
        let today = day("2026-03-10");
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let out = advance(&state(4, 4, Some(tomorrow)), today);
        assert_eq!(out.current, 4);
        assert!(!out.changed);
    }
}
