//! Persistence for user game profiles.
//!
//! All functions take a `&mut PgConnection` so callers can compose them
//! inside a single transaction. The engine locks the profile row with
//! [`fetch_for_update`] before any XP or streak mutation, which serializes
//! concurrent writers for the same user.

use chrono::{DateTime, Utc};
use questline_types::{UserGameProfile, UserId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;

/// Database row for the `user_game_profiles` table.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    total_xp: i64,
    current_level: i32,
    current_level_xp: i64,
    xp_to_next_level: i64,
    current_streak: i32,
    longest_streak: i32,
    last_activity_at: Option<DateTime<Utc>>,
    total_lessons_completed: i32,
    total_courses_completed: i32,
    total_quizzes_passed: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> UserGameProfile {
        UserGameProfile {
            user_id: UserId::from(self.user_id),
            total_xp: self.total_xp,
            current_level: u32::try_from(self.current_level).unwrap_or(1),
            current_level_xp: self.current_level_xp,
            xp_to_next_level: self.xp_to_next_level,
            current_streak: u32::try_from(self.current_streak).unwrap_or(0),
            longest_streak: u32::try_from(self.longest_streak).unwrap_or(0),
            last_activity_at: self.last_activity_at,
            total_lessons_completed: u32::try_from(self.total_lessons_completed).unwrap_or(0),
            total_courses_completed: u32::try_from(self.total_courses_completed).unwrap_or(0),
            total_quizzes_passed: u32::try_from(self.total_quizzes_passed).unwrap_or(0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Create the profile row for a user if it does not exist yet.
///
/// Profiles are created lazily on the first XP-worthy event or profile
/// read; the insert is a no-op for existing rows.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn ensure(conn: &mut PgConnection, user_id: UserId) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO user_game_profiles (user_id)
          VALUES ($1)
          ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id.into_inner())
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a user's profile, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn fetch(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Option<UserGameProfile>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r"SELECT user_id, total_xp, current_level, current_level_xp, xp_to_next_level,
                 current_streak, longest_streak, last_activity_at,
                 total_lessons_completed, total_courses_completed, total_quizzes_passed,
                 created_at, updated_at
          FROM user_game_profiles
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .fetch_optional(conn)
    .await?;

    Ok(row.map(ProfileRow::into_profile))
}

/// Fetch a user's profile with a row lock, creating it first if needed.
///
/// The lock is held until the surrounding transaction commits, so two
/// concurrent grants for the same user apply strictly one after the
/// other.
///
/// # Errors
///
/// Returns [`DbError::RowNotFound`] if the row vanished between the
/// ensure and the locked read, or [`DbError::Postgres`] on query failure.
pub async fn fetch_for_update(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<UserGameProfile, DbError> {
    ensure(&mut *conn, user_id).await?;

    let row = sqlx::query_as::<_, ProfileRow>(
        r"SELECT user_id, total_xp, current_level, current_level_xp, xp_to_next_level,
                 current_streak, longest_streak, last_activity_at,
                 total_lessons_completed, total_courses_completed, total_quizzes_passed,
                 created_at, updated_at
          FROM user_game_profiles
          WHERE user_id = $1
          FOR UPDATE",
    )
    .bind(user_id.into_inner())
    .fetch_optional(conn)
    .await?;

    row.map(ProfileRow::into_profile)
        .ok_or_else(|| DbError::RowNotFound(format!("game profile for user {user_id}")))
}

/// Write the cached XP aggregate and level breakdown.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn update_xp(
    conn: &mut PgConnection,
    user_id: UserId,
    total_xp: i64,
    level: u32,
    current_level_xp: i64,
    xp_to_next_level: i64,
) -> Result<(), DbError> {
    sqlx::query(
        r"UPDATE user_game_profiles
          SET total_xp = $2, current_level = $3, current_level_xp = $4,
              xp_to_next_level = $5, updated_at = now()
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .bind(total_xp)
    .bind(i32::try_from(level).unwrap_or(i32::MAX))
    .bind(current_level_xp)
    .bind(xp_to_next_level)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write the cached streak state and activity instant.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn update_streak(
    conn: &mut PgConnection,
    user_id: UserId,
    current_streak: u32,
    longest_streak: u32,
    last_activity_at: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        r"UPDATE user_game_profiles
          SET current_streak = $2, longest_streak = $3, last_activity_at = $4,
              updated_at = now()
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .bind(i32::try_from(current_streak).unwrap_or(i32::MAX))
    .bind(i32::try_from(longest_streak).unwrap_or(i32::MAX))
    .bind(last_activity_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Increment the lessons-completed counter.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn increment_lessons(conn: &mut PgConnection, user_id: UserId) -> Result<(), DbError> {
    sqlx::query(
        r"UPDATE user_game_profiles
          SET total_lessons_completed = total_lessons_completed + 1, updated_at = now()
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .execute(conn)
    .await?;
    Ok(())
}

/// Increment the courses-completed counter.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn increment_courses(conn: &mut PgConnection, user_id: UserId) -> Result<(), DbError> {
    sqlx::query(
        r"UPDATE user_game_profiles
          SET total_courses_completed = total_courses_completed + 1, updated_at = now()
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .execute(conn)
    .await?;
    Ok(())
}

/// Increment the quizzes-passed counter.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn increment_quizzes(conn: &mut PgConnection, user_id: UserId) -> Result<(), DbError> {
    sqlx::query(
        r"UPDATE user_game_profiles
          SET total_quizzes_passed = total_quizzes_passed + 1, updated_at = now()
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .execute(conn)
    .await?;
    Ok(())
}
