//! Calendar period boundaries for streaks and windowed leaderboards.
//!
//! Streak days and weekly/monthly leaderboard windows are defined in a
//! configured fixed UTC offset, never in server-local time. The week
//! starts at the most recent Monday 00:00; the month at the first day of
//! the current month 00:00, both in the configured offset and converted
//! back to UTC for querying `created_at` columns.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Build a fixed offset from a whole-minute displacement.
///
/// Out-of-range values (beyond +/- 23:59) fall back to UTC rather than
/// failing; the configuration loader validates earlier.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// The calendar day of an instant in the configured offset.
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Midnight at the start of a local calendar day, as a UTC instant.
///
/// Fixed offsets have no gaps or folds, so the local midnight always
/// exists; the fallback only guards the conversion API's `Option`.
fn day_start_utc(date: NaiveDate, offset: FixedOffset, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    offset
        .from_local_datetime(&midnight)
        .earliest()
        .map_or(fallback, |dt| dt.with_timezone(&Utc))
}

/// Start of the current week: the most recent Monday 00:00 in the
/// configured offset, as a UTC instant.
pub fn week_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_date(now, offset);
    let days_since_monday = u64::from(today.weekday().num_days_from_monday());
    let monday = today
        .checked_sub_days(Days::new(days_since_monday))
        .unwrap_or(today);
    day_start_utc(monday, offset, now)
}

/// Start of the current month: the first day of the month 00:00 in the
/// configured offset, as a UTC instant.
pub fn month_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_date(now, offset);
    let first = today.with_day(1).unwrap_or(today);
    day_start_utc(first, offset, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap_or_default()
    }

    fn offset_east(hours: i32) -> FixedOffset {
        offset_from_minutes(hours.saturating_mul(60))
    }

    #[test]
    fn week_starts_on_most_recent_monday() {
        // 2026-03-12 is a Thursday; the week began Monday 2026-03-09.
        let now = utc("2026-03-12T15:30:00Z");
        assert_eq!(week_start(now, Utc.fix()), utc("2026-03-09T00:00:00Z"));
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let now = utc("2026-03-09T00:00:00Z");
        assert_eq!(week_start(now, Utc.fix()), utc("2026-03-09T00:00:00Z"));
    }

    #[test]
    fn offset_shifts_the_week_boundary() {
        // 23:30 UTC Sunday is already Monday in UTC+2, so the week
        // starts at Sunday 22:00 UTC (Monday 00:00 local).
        let now = utc("2026-03-08T23:30:00Z");
        assert_eq!(
            week_start(now, offset_east(2)),
            utc("2026-03-08T22:00:00Z")
        );
        // In UTC itself the same instant is still the previous week.
        assert_eq!(week_start(now, Utc.fix()), utc("2026-03-02T00:00:00Z"));
    }

    #[test]
    fn month_starts_on_the_first() {
        let now = utc("2026-03-12T09:00:00Z");
        assert_eq!(month_start(now, Utc.fix()), utc("2026-03-01T00:00:00Z"));
    }

    #[test]
    fn negative_offset_shifts_month_boundary() {
        // 01:00 UTC on March 1st is still February in UTC-5, so the
        // month window opens at February 1st 00:00 local (05:00 UTC).
        let now = utc("2026-03-01T01:00:00Z");
        let minus_five = offset_from_minutes(-300);
        assert_eq!(month_start(now, minus_five), utc("2026-02-01T05:00:00Z"));
    }

    #[test]
    fn local_date_respects_offset() {
        let instant = utc("2026-03-10T23:30:00Z");
        assert_eq!(local_date(instant, Utc.fix()).to_string(), "2026-03-10");
        assert_eq!(
            local_date(instant, offset_east(2)).to_string(),
            "2026-03-11"
        );
    }
}
