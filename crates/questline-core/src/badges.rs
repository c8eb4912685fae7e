//! Badge requirement predicates.
//!
//! Each badge names a [`BadgeRequirement`] and a target value. The rule
//! engine maps the requirement kind to the stat it checks; the engine
//! crate resolves a [`ProfileStats`] snapshot (profile counters plus the
//! one query-backed stat, perfect-quiz count) and every predicate becomes
//! a uniform `observed >= target` comparison. Cheap and expensive
//! predicates are interchangeable once the snapshot exists.

use questline_types::BadgeRequirement;

/// A snapshot of the stats badge predicates check.
///
/// Built from the user's game profile inside the awarding transaction,
/// so predicates observe XP/streak/counter values already updated by the
/// same causal chain (read-your-writes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStats {
    /// Lifetime XP.
    pub total_xp: i64,
    /// Current level.
    pub level: u32,
    /// Current streak length in days.
    pub current_streak: u32,
    /// Lessons completed.
    pub lessons_completed: u32,
    /// Courses completed.
    pub courses_completed: u32,
    /// Quizzes passed.
    pub quizzes_passed: u32,
    /// Quizzes answered with a maximum score (query-backed stat).
    pub perfect_quizzes: u32,
}

impl ProfileStats {
    /// The observed value for a requirement kind.
    pub fn observed(&self, requirement: BadgeRequirement) -> i64 {
        match requirement {
            BadgeRequirement::LessonsCompleted => i64::from(self.lessons_completed),
            BadgeRequirement::CoursesCompleted => i64::from(self.courses_completed),
            BadgeRequirement::QuizzesPassed => i64::from(self.quizzes_passed),
            BadgeRequirement::StreakDays => i64::from(self.current_streak),
            BadgeRequirement::TotalXp => self.total_xp,
            BadgeRequirement::LevelReached => i64::from(self.level),
            BadgeRequirement::PerfectQuizzes => i64::from(self.perfect_quizzes),
        }
    }
}

/// Whether a requirement is satisfied by the observed stats.
pub fn requirement_met(
    requirement: BadgeRequirement,
    target_value: i64,
    stats: &ProfileStats,
) -> bool {
    stats.observed(requirement) >= target_value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ProfileStats {
        ProfileStats {
            total_xp: 450,
            level: 3,
            current_streak: 7,
            lessons_completed: 12,
            courses_completed: 1,
            quizzes_passed: 5,
            perfect_quizzes: 2,
        }
    }

    #[test]
    fn thresholds_at_exactly_target_are_met() {
        let s = stats();
        assert!(requirement_met(BadgeRequirement::LessonsCompleted, 12, &s));
        assert!(requirement_met(BadgeRequirement::StreakDays, 7, &s));
        assert!(requirement_met(BadgeRequirement::TotalXp, 450, &s));
    }

    #[test]
    fn thresholds_above_observed_are_not_met() {
        let s = stats();
        assert!(!requirement_met(BadgeRequirement::CoursesCompleted, 2, &s));
        assert!(!requirement_met(BadgeRequirement::LevelReached, 4, &s));
        assert!(!requirement_met(BadgeRequirement::PerfectQuizzes, 3, &s));
    }

    #[test]
    fn every_requirement_kind_has_an_observed_value() {
        let s = stats();
        let observed = [
            (BadgeRequirement::LessonsCompleted, 12),
            (BadgeRequirement::CoursesCompleted, 1),
            (BadgeRequirement::QuizzesPassed, 5),
            (BadgeRequirement::StreakDays, 7),
            (BadgeRequirement::TotalXp, 450),
            (BadgeRequirement::LevelReached, 3),
            (BadgeRequirement::PerfectQuizzes, 2),
        ];
        for (req, expected) in observed {
            assert_eq!(s.observed(req), expected, "{req:?}");
        }
    }
}
