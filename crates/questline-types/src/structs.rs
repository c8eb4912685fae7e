//! Core entity structs for the Questline gamification platform.
//!
//! Covers the user game profile, the XP ledger transaction record, the
//! badge catalog and awards, materialized leaderboards, and the
//! collaboration group/goal/session records. These mirror the backing
//! tables one-to-one; row conversion lives in the data layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{
    BadgeCategory, BadgeRarity, BadgeRequirement, GroupRole, LeaderboardKind, ReferenceKind,
    SessionReply, SessionStatus, XpReason,
};
use crate::ids::{
    BadgeId, ContentBlockId, CourseId, GoalId, GoalUpdateId, GroupId, LeaderboardEntryId,
    LeaderboardId, LessonId, QuizAttemptId, SessionId, UserBadgeId, UserId, XpTransactionId,
};

// ---------------------------------------------------------------------------
// User game profile
// ---------------------------------------------------------------------------

/// Per-user gamification aggregate: the cached projection of the XP ledger
/// plus streak state and activity counters.
///
/// Created lazily on the first XP-worthy event or profile read; never
/// deleted. All mutation flows through the ledger's transactional update
/// path, which serializes concurrent writers with a row lock. The cached
/// `total_xp` must always equal the clamped sum of the user's ledger
/// amounts -- the two are updated in the same database transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserGameProfile {
    /// The user this profile belongs to.
    pub user_id: UserId,
    /// Lifetime XP, non-negative. Clamped at zero under administrative
    /// corrections.
    pub total_xp: i64,
    /// Cached level derived from `total_xp`.
    pub current_level: u32,
    /// Cached XP accumulated within the current level.
    pub current_level_xp: i64,
    /// Cached XP still needed to reach the next level.
    pub xp_to_next_level: i64,
    /// Consecutive calendar days with qualifying activity.
    pub current_streak: u32,
    /// Longest streak ever reached. Always >= `current_streak`.
    pub longest_streak: u32,
    /// Instant of the most recent qualifying activity, if any.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Count of lessons completed (first completions only).
    pub total_lessons_completed: u32,
    /// Count of courses completed.
    pub total_courses_completed: u32,
    /// Count of quizzes passed.
    pub total_quizzes_passed: u32,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}

/// Breakdown of a total XP value into level terms.
///
/// Produced by the pure level calculator; identical for live grants and
/// display-only reads by construction (there is only one implementation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LevelProgress {
    /// The level the XP total has reached (starts at 1).
    pub level: u32,
    /// XP accumulated within the current level.
    pub current_level_xp: i64,
    /// XP still needed to cross into the next level.
    pub xp_to_next_level: i64,
}

// ---------------------------------------------------------------------------
// XP ledger
// ---------------------------------------------------------------------------

/// One append-only XP ledger entry.
///
/// Entries are never mutated or deleted by normal flow. The per-user sum
/// of `amount`, clamped at zero, is the source of truth for
/// [`UserGameProfile::total_xp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpTransaction {
    /// Transaction identifier.
    pub id: XpTransactionId,
    /// The user credited (or debited, for corrections).
    pub user_id: UserId,
    /// Signed amount. Positive for grants; negative only for
    /// [`XpReason::AdminAdjustment`].
    pub amount: i64,
    /// The event kind that produced this entry.
    pub reason: XpReason,
    /// Human-readable description for the activity feed.
    pub description: String,
    /// The entity that caused the grant, if any.
    pub reference_id: Option<Uuid>,
    /// What kind of entity `reference_id` names.
    pub reference_kind: Option<ReferenceKind>,
    /// Append instant.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// A badge definition from the admin-authored catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Badge {
    /// Badge identifier.
    pub id: BadgeId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Display grouping.
    pub category: BadgeCategory,
    /// The threshold kind this badge checks.
    pub requirement: BadgeRequirement,
    /// The threshold value the requirement must reach.
    pub target_value: i64,
    /// XP granted through the ledger when the badge is earned.
    pub xp_reward: i64,
    /// Display rarity.
    pub rarity: BadgeRarity,
    /// Inactive badges are never evaluated or displayed.
    pub is_active: bool,
    /// Catalog ordering, ascending.
    pub sort_order: i32,
}

/// A badge earned by a user. At most one row per (user, badge) pair,
/// enforced by a unique constraint -- awards happen exactly once, ever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserBadge {
    /// Award row identifier.
    pub id: UserBadgeId,
    /// The user who earned the badge.
    pub user_id: UserId,
    /// The badge earned.
    pub badge_id: BadgeId,
    /// Award instant.
    pub earned_at: DateTime<Utc>,
    /// The stat value observed when the badge was awarded.
    pub progress: i64,
}

/// A badge paired with its award timestamp, for "newly earned" display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AwardedBadge {
    /// The catalog definition.
    pub badge: Badge,
    /// When this user earned it.
    pub earned_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// A named ranking view in the leaderboard catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Leaderboard {
    /// Leaderboard identifier.
    pub id: LeaderboardId,
    /// The metric and timeframe this view ranks by.
    pub kind: LeaderboardKind,
    /// Display name.
    pub name: String,
    /// Instant of the last successful recomputation, if any.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// One materialized row of a leaderboard snapshot.
///
/// Entries are fully replaced on each recomputation; `user_name` and
/// `user_image` are denormalized snapshots taken at computation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// Entry identifier.
    pub id: LeaderboardEntryId,
    /// The leaderboard this entry belongs to.
    pub leaderboard_id: LeaderboardId,
    /// The ranked user.
    pub user_id: UserId,
    /// The metric value for this user.
    pub score: i64,
    /// Dense 1-based rank; score is non-increasing as rank increases.
    pub rank: u32,
    /// Display name snapshot at computation time.
    pub user_name: String,
    /// Avatar URL snapshot at computation time.
    pub user_image: Option<String>,
}

/// Display identity for a user, maintained by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserDisplay {
    /// The user.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Avatar URL, if set.
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Quiz attempts
// ---------------------------------------------------------------------------

/// One append-only quiz attempt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuizAttempt {
    /// Attempt identifier.
    pub id: QuizAttemptId,
    /// The user who attempted the quiz.
    pub user_id: UserId,
    /// The quiz content block attempted.
    pub block_id: ContentBlockId,
    /// Score achieved.
    pub score: i64,
    /// Maximum achievable score for this quiz.
    pub max_score: i64,
    /// Whether the attempt cleared the passing bar.
    pub is_passed: bool,
    /// Time spent on the attempt, in whole seconds.
    pub time_spent_secs: u32,
    /// Append instant.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Course catalog read models (consumed, not owned)
// ---------------------------------------------------------------------------

/// Linkage and structure of a lesson, as exposed by the content
/// collaborator: which course it belongs to and which interactive blocks
/// must be complete before the lesson can be marked complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LessonRef {
    /// The lesson.
    pub lesson_id: LessonId,
    /// The owning course.
    pub course_id: CourseId,
    /// Lesson title for descriptions in the ledger.
    pub title: String,
    /// Interactive block ids that gate completion.
    pub required_block_ids: Vec<ContentBlockId>,
    /// Quiz block ids within the lesson (subset of the interactive blocks).
    pub quiz_block_ids: Vec<ContentBlockId>,
}

// ---------------------------------------------------------------------------
// Collaboration
// ---------------------------------------------------------------------------

/// A collaboration group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollabGroup {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// The user who created the group.
    pub owner_id: UserId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A group membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GroupMember {
    /// The group.
    pub group_id: GroupId,
    /// The member.
    pub user_id: UserId,
    /// The member's role.
    pub role: GroupRole,
    /// Join instant.
    pub joined_at: DateTime<Utc>,
}

/// A group-scoped shared numeric goal.
///
/// `progress_value` is a cached, clamped running sum of the goal's update
/// deltas: it never exceeds `target_value` and never drops below zero,
/// even though the underlying deltas are unclamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollabGoal {
    /// Goal identifier.
    pub id: GoalId,
    /// The owning group.
    pub group_id: GroupId,
    /// Display title.
    pub title: String,
    /// The value the group is working toward.
    pub target_value: i64,
    /// Clamped running progress, in [0, `target_value`].
    pub progress_value: i64,
    /// The member who created the goal.
    pub created_by: UserId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// One append-only, attributed goal progress delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GoalUpdate {
    /// Update identifier.
    pub id: GoalUpdateId,
    /// The goal updated.
    pub goal_id: GoalId,
    /// The contributing member.
    pub user_id: UserId,
    /// Raw signed delta (unclamped; clamping applies to the cached sum).
    pub amount: i64,
    /// Optional note from the contributor.
    pub note: Option<String>,
    /// Append instant.
    pub created_at: DateTime<Utc>,
}

/// A scheduled group study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StudySession {
    /// Session identifier.
    pub id: SessionId,
    /// The owning group.
    pub group_id: GroupId,
    /// The member hosting the session.
    pub host_id: UserId,
    /// Display title.
    pub title: String,
    /// When the session is scheduled to start.
    pub scheduled_at: DateTime<Utc>,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A member's recorded reply to a session invitation. One row per
/// (session, user); a later reply overwrites the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionResponse {
    /// The session replied to.
    pub session_id: SessionId,
    /// The replying member.
    pub user_id: UserId,
    /// The reply.
    pub reply: SessionReply,
    /// Reply instant.
    pub responded_at: DateTime<Utc>,
}
