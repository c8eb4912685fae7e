//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the platform has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) for efficient database indexing.
//!
//! User identity is resolved by an external auth collaborator; [`UserId`]
//! is the opaque handle it yields. The `new()` constructors exist for
//! cases where app-side generation is needed (e.g. tests, seed data).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Opaque identifier for a platform user (resolved by the auth layer).
    UserId
}

define_id! {
    /// Unique identifier for a course.
    CourseId
}

define_id! {
    /// Unique identifier for a lesson within a course.
    LessonId
}

define_id! {
    /// Unique identifier for a content block within a lesson.
    ContentBlockId
}

define_id! {
    /// Unique identifier for a single quiz attempt record.
    QuizAttemptId
}

define_id! {
    /// Unique identifier for an XP ledger transaction.
    XpTransactionId
}

define_id! {
    /// Unique identifier for a badge in the admin-authored catalog.
    BadgeId
}

define_id! {
    /// Unique identifier for a badge award (user/badge junction row).
    UserBadgeId
}

define_id! {
    /// Unique identifier for a named leaderboard view.
    LeaderboardId
}

define_id! {
    /// Unique identifier for a materialized leaderboard entry.
    LeaderboardEntryId
}

define_id! {
    /// Unique identifier for a collaboration group.
    GroupId
}

define_id! {
    /// Unique identifier for a group-scoped shared goal.
    GoalId
}

define_id! {
    /// Unique identifier for an attributed goal progress update.
    GoalUpdateId
}

define_id! {
    /// Unique identifier for a scheduled group study session.
    SessionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let user = UserId::new();
        let lesson = LessonId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(user.into_inner(), Uuid::nil());
        assert_ne!(lesson.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = UserId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<UserId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = BadgeId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
