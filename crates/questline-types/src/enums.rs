//! Enumeration types for the Questline gamification platform.
//!
//! Covers XP grant reasons, badge requirement kinds, leaderboard kinds,
//! and collaboration group/session enumerations. Database string
//! conversions live in the data layer, not here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// XP ledger
// ---------------------------------------------------------------------------

/// The kind of learning event that produced an XP transaction.
///
/// Every ledger entry carries exactly one reason. The reason is immutable
/// once recorded; it drives display text and the weekly/monthly leaderboard
/// aggregation (which sums all reasons alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum XpReason {
    /// A lesson was completed for the first time.
    LessonCompleted,
    /// Every lesson of a course is complete.
    CourseCompleted,
    /// A quiz was answered well enough to pass.
    QuizPassed,
    /// Bonus for flawless quiz performance within a lesson.
    PerformanceBonus,
    /// The user's streak reached a positive multiple of seven days.
    StreakMilestone,
    /// A badge carrying an XP reward was earned.
    BadgeEarned,
    /// Administrative correction (the only source of negative amounts).
    AdminAdjustment,
}

/// The kind of entity an XP transaction references as its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ReferenceKind {
    /// The transaction was caused by a lesson.
    Lesson,
    /// The transaction was caused by a course.
    Course,
    /// The transaction was caused by a quiz content block.
    ContentBlock,
    /// The transaction was caused by a badge award.
    Badge,
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// The threshold a badge checks against the user's accumulated stats.
///
/// Each requirement kind maps to one evaluator in the badge rule engine.
/// All but [`PerfectQuizzes`](Self::PerfectQuizzes) are cheap in-memory
/// comparisons against profile counters; that one is backed by a count
/// query over quiz-attempt history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BadgeRequirement {
    /// Total lessons completed reaches the target.
    LessonsCompleted,
    /// Total courses completed reaches the target.
    CoursesCompleted,
    /// Total quizzes passed reaches the target.
    QuizzesPassed,
    /// Current streak length (consecutive days) reaches the target.
    StreakDays,
    /// Lifetime XP total reaches the target.
    TotalXp,
    /// Current level reaches the target.
    LevelReached,
    /// Number of quizzes answered with a maximum score reaches the target.
    PerfectQuizzes,
}

/// Display grouping for the badge catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BadgeCategory {
    /// Lesson and course completion milestones.
    Progress,
    /// Streak and habit-forming milestones.
    Consistency,
    /// Quiz performance milestones.
    Mastery,
    /// XP and level milestones.
    Achievement,
}

/// How rare a badge is, for display ordering and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BadgeRarity {
    /// Earned by most active users.
    Common,
    /// Requires sustained activity.
    Uncommon,
    /// Requires notable commitment.
    Rare,
    /// Requires exceptional commitment.
    Epic,
    /// The long tail of dedication.
    Legendary,
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// The metric and timeframe a leaderboard ranks users by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LeaderboardKind {
    /// Lifetime XP from the profile projection.
    AllTimeXp,
    /// Positive XP sums since the most recent Monday 00:00 (configured offset).
    WeeklyXp,
    /// Positive XP sums since the first of the current month.
    MonthlyXp,
    /// Current streak length.
    Streak,
    /// Total courses completed.
    CoursesCompleted,
}

impl LeaderboardKind {
    /// All leaderboard kinds, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::AllTimeXp,
        Self::WeeklyXp,
        Self::MonthlyXp,
        Self::Streak,
        Self::CoursesCompleted,
    ];

    /// Human-readable display name for the catalog row.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::AllTimeXp => "All-Time XP",
            Self::WeeklyXp => "Weekly XP",
            Self::MonthlyXp => "Monthly XP",
            Self::Streak => "Longest Active Streak",
            Self::CoursesCompleted => "Courses Completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Collaboration
// ---------------------------------------------------------------------------

/// A member's role within a collaboration group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GroupRole {
    /// Created the group; may manage membership.
    Owner,
    /// Ordinary member.
    Member,
}

/// Lifecycle state of a scheduled study session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SessionStatus {
    /// The session is upcoming.
    Scheduled,
    /// The host cancelled the session.
    Cancelled,
    /// The session took place.
    Completed,
}

/// A member's reply to a study session invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SessionReply {
    /// The member plans to attend.
    Accepted,
    /// The member declined.
    Declined,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_kinds_are_exhaustive() {
        assert_eq!(LeaderboardKind::ALL.len(), 5);
    }

    #[test]
    fn xp_reason_serde_roundtrip() {
        let json = serde_json::to_string(&XpReason::StreakMilestone).ok();
        assert_eq!(json.as_deref(), Some("\"StreakMilestone\""));
    }
}
