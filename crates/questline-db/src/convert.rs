//! Conversions between domain enums and their database string forms.
//!
//! Enum-like columns are stored as `TEXT`. The `*_to_db` functions are total;
//! the `*_from_db` functions return [`DbError::Decode`] for unknown values so
//! a corrupted row surfaces as an error instead of a silent default.

use questline_types::{
    BadgeCategory, BadgeRarity, BadgeRequirement, GroupRole, LeaderboardKind, ReferenceKind,
    SessionReply, SessionStatus, XpReason,
};

use crate::error::DbError;

/// Convert an [`XpReason`] to its database string representation.
pub const fn reason_to_db(reason: XpReason) -> &'static str {
    match reason {
        XpReason::LessonCompleted => "lesson_completed",
        XpReason::CourseCompleted => "course_completed",
        XpReason::QuizPassed => "quiz_passed",
        XpReason::PerformanceBonus => "performance_bonus",
        XpReason::StreakMilestone => "streak_milestone",
        XpReason::BadgeEarned => "badge_earned",
        XpReason::AdminAdjustment => "admin_adjustment",
    }
}

/// Parse an [`XpReason`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn reason_from_db(value: &str) -> Result<XpReason, DbError> {
    match value {
        "lesson_completed" => Ok(XpReason::LessonCompleted),
        "course_completed" => Ok(XpReason::CourseCompleted),
        "quiz_passed" => Ok(XpReason::QuizPassed),
        "performance_bonus" => Ok(XpReason::PerformanceBonus),
        "streak_milestone" => Ok(XpReason::StreakMilestone),
        "badge_earned" => Ok(XpReason::BadgeEarned),
        "admin_adjustment" => Ok(XpReason::AdminAdjustment),
        other => Err(DbError::Decode(format!("unknown xp reason: {other}"))),
    }
}

/// Convert a [`ReferenceKind`] to its database string representation.
pub const fn reference_kind_to_db(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Lesson => "lesson",
        ReferenceKind::Course => "course",
        ReferenceKind::ContentBlock => "content_block",
        ReferenceKind::Badge => "badge",
    }
}

/// Parse a [`ReferenceKind`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn reference_kind_from_db(value: &str) -> Result<ReferenceKind, DbError> {
    match value {
        "lesson" => Ok(ReferenceKind::Lesson),
        "course" => Ok(ReferenceKind::Course),
        "content_block" => Ok(ReferenceKind::ContentBlock),
        "badge" => Ok(ReferenceKind::Badge),
        other => Err(DbError::Decode(format!("unknown reference kind: {other}"))),
    }
}

/// Convert a [`BadgeCategory`] to its database string representation.
pub const fn category_to_db(category: BadgeCategory) -> &'static str {
    match category {
        BadgeCategory::Progress => "progress",
        BadgeCategory::Consistency => "consistency",
        BadgeCategory::Mastery => "mastery",
        BadgeCategory::Achievement => "achievement",
    }
}

/// Parse a [`BadgeCategory`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn category_from_db(value: &str) -> Result<BadgeCategory, DbError> {
    match value {
        "progress" => Ok(BadgeCategory::Progress),
        "consistency" => Ok(BadgeCategory::Consistency),
        "mastery" => Ok(BadgeCategory::Mastery),
        "achievement" => Ok(BadgeCategory::Achievement),
        other => Err(DbError::Decode(format!("unknown badge category: {other}"))),
    }
}

/// Convert a [`BadgeRequirement`] to its database string representation.
pub const fn requirement_to_db(requirement: BadgeRequirement) -> &'static str {
    match requirement {
        BadgeRequirement::LessonsCompleted => "lessons_completed",
        BadgeRequirement::CoursesCompleted => "courses_completed",
        BadgeRequirement::QuizzesPassed => "quizzes_passed",
        BadgeRequirement::StreakDays => "streak_days",
        BadgeRequirement::TotalXp => "total_xp",
        BadgeRequirement::LevelReached => "level_reached",
        BadgeRequirement::PerfectQuizzes => "perfect_quizzes",
    }
}

/// Parse a [`BadgeRequirement`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn requirement_from_db(value: &str) -> Result<BadgeRequirement, DbError> {
    match value {
        "lessons_completed" => Ok(BadgeRequirement::LessonsCompleted),
        "courses_completed" => Ok(BadgeRequirement::CoursesCompleted),
        "quizzes_passed" => Ok(BadgeRequirement::QuizzesPassed),
        "streak_days" => Ok(BadgeRequirement::StreakDays),
        "total_xp" => Ok(BadgeRequirement::TotalXp),
        "level_reached" => Ok(BadgeRequirement::LevelReached),
        "perfect_quizzes" => Ok(BadgeRequirement::PerfectQuizzes),
        other => Err(DbError::Decode(format!("unknown badge requirement: {other}"))),
    }
}

/// Convert a [`BadgeRarity`] to its database string representation.
pub const fn rarity_to_db(rarity: BadgeRarity) -> &'static str {
    match rarity {
        BadgeRarity::Common => "common",
        BadgeRarity::Uncommon => "uncommon",
        BadgeRarity::Rare => "rare",
        BadgeRarity::Epic => "epic",
        BadgeRarity::Legendary => "legendary",
    }
}

/// Parse a [`BadgeRarity`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn rarity_from_db(value: &str) -> Result<BadgeRarity, DbError> {
    match value {
        "common" => Ok(BadgeRarity::Common),
        "uncommon" => Ok(BadgeRarity::Uncommon),
        "rare" => Ok(BadgeRarity::Rare),
        "epic" => Ok(BadgeRarity::Epic),
        "legendary" => Ok(BadgeRarity::Legendary),
        other => Err(DbError::Decode(format!("unknown badge rarity: {other}"))),
    }
}

/// Convert a [`LeaderboardKind`] to its database string representation.
pub const fn kind_to_db(kind: LeaderboardKind) -> &'static str {
    match kind {
        LeaderboardKind::AllTimeXp => "all_time_xp",
        LeaderboardKind::WeeklyXp => "weekly_xp",
        LeaderboardKind::MonthlyXp => "monthly_xp",
        LeaderboardKind::Streak => "streak",
        LeaderboardKind::CoursesCompleted => "courses_completed",
    }
}

/// Parse a [`LeaderboardKind`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn kind_from_db(value: &str) -> Result<LeaderboardKind, DbError> {
    match value {
        "all_time_xp" => Ok(LeaderboardKind::AllTimeXp),
        "weekly_xp" => Ok(LeaderboardKind::WeeklyXp),
        "monthly_xp" => Ok(LeaderboardKind::MonthlyXp),
        "streak" => Ok(LeaderboardKind::Streak),
        "courses_completed" => Ok(LeaderboardKind::CoursesCompleted),
        other => Err(DbError::Decode(format!("unknown leaderboard kind: {other}"))),
    }
}

/// Convert a [`GroupRole`] to its database string representation.
pub const fn role_to_db(role: GroupRole) -> &'static str {
    match role {
        GroupRole::Owner => "owner",
        GroupRole::Member => "member",
    }
}

/// Parse a [`GroupRole`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn role_from_db(value: &str) -> Result<GroupRole, DbError> {
    match value {
        "owner" => Ok(GroupRole::Owner),
        "member" => Ok(GroupRole::Member),
        other => Err(DbError::Decode(format!("unknown group role: {other}"))),
    }
}

/// Convert a [`SessionStatus`] to its database string representation.
pub const fn status_to_db(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Scheduled => "scheduled",
        SessionStatus::Cancelled => "cancelled",
        SessionStatus::Completed => "completed",
    }
}

/// Parse a [`SessionStatus`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn status_from_db(value: &str) -> Result<SessionStatus, DbError> {
    match value {
        "scheduled" => Ok(SessionStatus::Scheduled),
        "cancelled" => Ok(SessionStatus::Cancelled),
        "completed" => Ok(SessionStatus::Completed),
        other => Err(DbError::Decode(format!("unknown session status: {other}"))),
    }
}

/// Convert a [`SessionReply`] to its database string representation.
pub const fn reply_to_db(reply: SessionReply) -> &'static str {
    match reply {
        SessionReply::Accepted => "accepted",
        SessionReply::Declined => "declined",
    }
}

/// Parse a [`SessionReply`] from its database string representation.
///
/// # Errors
///
/// Returns [`DbError::Decode`] for unknown values.
pub fn reply_from_db(value: &str) -> Result<SessionReply, DbError> {
    match value {
        "accepted" => Ok(SessionReply::Accepted),
        "declined" => Ok(SessionReply::Declined),
        other => Err(DbError::Decode(format!("unknown session reply: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_round_trips() {
        let reasons = [
            XpReason::LessonCompleted,
            XpReason::CourseCompleted,
            XpReason::QuizPassed,
            XpReason::PerformanceBonus,
            XpReason::StreakMilestone,
            XpReason::BadgeEarned,
            XpReason::AdminAdjustment,
        ];
        for reason in reasons {
            assert_eq!(reason_from_db(reason_to_db(reason)).ok(), Some(reason));
        }
    }

    #[test]
    fn every_kind_round_trips() {
        for kind in LeaderboardKind::ALL {
            assert_eq!(kind_from_db(kind_to_db(kind)).ok(), Some(kind));
        }
    }

    #[test]
    fn unknown_value_is_a_decode_error() {
        let result = kind_from_db("daily_logins");
        assert!(matches!(result, Err(DbError::Decode(_))));
    }
}
