//! Operation result types returned by the gamification engine.
//!
//! Each multi-step operation returns an explicit outcome capturing what
//! happened at every step, rather than leaving callers to infer effects
//! from side channels. These flow to the web client for celebratory
//! display (XP earned, level-up flag, new badges).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::CourseId;
use crate::structs::{
    AwardedBadge, Badge, CollabGoal, GoalUpdate, LevelProgress, UserGameProfile, XpTransaction,
};

/// Result of a single XP grant through the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpAward {
    /// The appended ledger transaction.
    pub transaction: XpTransaction,
    /// The profile after the grant.
    pub profile: UserGameProfile,
    /// Whether the grant pushed the user past a level threshold.
    pub leveled_up: bool,
    /// The level after the grant.
    pub new_level: u32,
}

/// Result of a streak update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StreakOutcome {
    /// Streak length after the update.
    pub current_streak: u32,
    /// Longest streak ever reached.
    pub longest_streak: u32,
    /// True only if `longest_streak` increased in this update.
    pub is_new_record: bool,
}

/// Result of a lesson completion: one record per pipeline step.
///
/// When `already_completed` is true every other field is inert -- the
/// duplicate call granted nothing and triggered nothing, but is still
/// reported as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CompletionOutcome {
    /// True if the lesson had already been completed by this user.
    pub already_completed: bool,
    /// Total XP granted across all steps of this completion.
    pub xp_earned: i64,
    /// Whether any grant in the chain produced a level-up.
    pub leveled_up: bool,
    /// The level after the completion.
    pub new_level: u32,
    /// The streak update applied, when the completion was new.
    pub streak: Option<StreakOutcome>,
    /// Badges newly awarded by the post-commit evaluation. May be empty
    /// or partial if badge evaluation failed; the completion itself is
    /// unaffected.
    pub badges_awarded: Vec<AwardedBadge>,
    /// Set when this lesson was the last one outstanding in its course.
    pub course_completed: Option<CourseId>,
}

/// Result of recording a quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuizOutcome {
    /// Whether the attempt passed.
    pub passed: bool,
    /// Whether the attempt achieved the maximum score.
    pub perfect: bool,
    /// Total XP granted for this attempt.
    pub xp_earned: i64,
    /// Whether a grant in this attempt produced a level-up.
    pub leveled_up: bool,
    /// The level after the attempt.
    pub new_level: u32,
    /// Badges newly awarded by the post-commit evaluation.
    pub badges_awarded: Vec<AwardedBadge>,
}

/// The full gamification view of one user, assembled for display.
///
/// The level breakdown is recomputed from the stored XP total through the
/// pure calculator at read time; the cached level columns are never
/// trusted alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GamificationProfile {
    /// The profile aggregate.
    pub profile: UserGameProfile,
    /// Badges this user has earned, newest first.
    pub earned_badges: Vec<AwardedBadge>,
    /// Active catalog badges not yet earned, in catalog order.
    pub locked_badges: Vec<Badge>,
    /// The most recent ledger entries, newest first, bounded by
    /// configuration.
    pub recent_transactions: Vec<XpTransaction>,
    /// Display level breakdown recomputed from `profile.total_xp`.
    pub level_progress: LevelProgress,
}

/// Result of recording goal progress: the appended update and the goal
/// with its clamped progress, persisted atomically together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GoalProgress {
    /// The appended attributed delta.
    pub update: GoalUpdate,
    /// The goal after clamped recomputation.
    pub goal: CollabGoal,
}
