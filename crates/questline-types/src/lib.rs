//! Shared type definitions for the Questline gamification platform.
//!
//! This crate is the single source of truth for all types used across the
//! Questline workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (XP reasons, badge requirements,
//!   leaderboard kinds, collaboration roles)
//! - [`structs`] -- Core entity structs (profiles, ledger, badges,
//!   leaderboards, collaboration)
//! - [`content`] -- Lesson content blocks as a closed tagged union
//! - [`outcomes`] -- Operation result types returned by the engine

pub mod content;
pub mod enums;
pub mod ids;
pub mod outcomes;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use content::{BlockContent, ContentBlock};
pub use enums::{
    BadgeCategory, BadgeRarity, BadgeRequirement, GroupRole, LeaderboardKind, ReferenceKind,
    SessionReply, SessionStatus, XpReason,
};
pub use ids::{
    BadgeId, ContentBlockId, CourseId, GoalId, GoalUpdateId, GroupId, LeaderboardEntryId,
    LeaderboardId, LessonId, QuizAttemptId, SessionId, UserBadgeId, UserId, XpTransactionId,
};
pub use outcomes::{
    CompletionOutcome, GamificationProfile, GoalProgress, QuizOutcome, StreakOutcome, XpAward,
};
pub use structs::{
    AwardedBadge, Badge, CollabGoal, CollabGroup, GoalUpdate, GroupMember, Leaderboard,
    LeaderboardEntry, LessonRef, LevelProgress, QuizAttempt, SessionResponse, StudySession,
    UserBadge, UserDisplay, UserGameProfile, XpTransaction,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::CourseId::export_all();
        let _ = crate::ids::LessonId::export_all();
        let _ = crate::ids::ContentBlockId::export_all();
        let _ = crate::ids::QuizAttemptId::export_all();
        let _ = crate::ids::XpTransactionId::export_all();
        let _ = crate::ids::BadgeId::export_all();
        let _ = crate::ids::UserBadgeId::export_all();
        let _ = crate::ids::LeaderboardId::export_all();
        let _ = crate::ids::LeaderboardEntryId::export_all();
        let _ = crate::ids::GroupId::export_all();
        let _ = crate::ids::GoalId::export_all();
        let _ = crate::ids::GoalUpdateId::export_all();
        let _ = crate::ids::SessionId::export_all();

        // Enums
        let _ = crate::enums::XpReason::export_all();
        let _ = crate::enums::ReferenceKind::export_all();
        let _ = crate::enums::BadgeRequirement::export_all();
        let _ = crate::enums::BadgeCategory::export_all();
        let _ = crate::enums::BadgeRarity::export_all();
        let _ = crate::enums::LeaderboardKind::export_all();
        let _ = crate::enums::GroupRole::export_all();
        let _ = crate::enums::SessionStatus::export_all();
        let _ = crate::enums::SessionReply::export_all();

        // Content blocks
        let _ = crate::content::BlockContent::export_all();
        let _ = crate::content::ContentBlock::export_all();

        // Structs
        let _ = crate::structs::UserGameProfile::export_all();
        let _ = crate::structs::LevelProgress::export_all();
        let _ = crate::structs::XpTransaction::export_all();
        let _ = crate::structs::Badge::export_all();
        let _ = crate::structs::UserBadge::export_all();
        let _ = crate::structs::AwardedBadge::export_all();
        let _ = crate::structs::Leaderboard::export_all();
        let _ = crate::structs::LeaderboardEntry::export_all();
        let _ = crate::structs::UserDisplay::export_all();
        let _ = crate::structs::QuizAttempt::export_all();
        let _ = crate::structs::LessonRef::export_all();
        let _ = crate::structs::CollabGroup::export_all();
        let _ = crate::structs::GroupMember::export_all();
        let _ = crate::structs::CollabGoal::export_all();
        let _ = crate::structs::GoalUpdate::export_all();
        let _ = crate::structs::StudySession::export_all();
        let _ = crate::structs::SessionResponse::export_all();

        // Outcomes
        let _ = crate::outcomes::XpAward::export_all();
        let _ = crate::outcomes::StreakOutcome::export_all();
        let _ = crate::outcomes::CompletionOutcome::export_all();
        let _ = crate::outcomes::QuizOutcome::export_all();
        let _ = crate::outcomes::GamificationProfile::export_all();
        let _ = crate::outcomes::GoalProgress::export_all();
    }
}
