//! Persistence for lesson, block and course completion markers.
//!
//! Each table keys on (user, entity), so a repeat completion inserts
//! nothing and the insert's row count tells the caller whether this was a
//! first completion.

use questline_types::{ContentBlockId, CourseId, LessonId, UserId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;

/// Mark a lesson complete. Returns `false` if it was already complete.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn complete_lesson(
    conn: &mut PgConnection,
    user_id: UserId,
    lesson_id: LessonId,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        r"INSERT INTO lesson_progress (user_id, lesson_id)
          VALUES ($1, $2)
          ON CONFLICT (user_id, lesson_id) DO NOTHING",
    )
    .bind(user_id.into_inner())
    .bind(lesson_id.into_inner())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a lesson is already marked complete for the user.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn lesson_completed(
    conn: &mut PgConnection,
    user_id: UserId,
    lesson_id: LessonId,
) -> Result<bool, DbError> {
    let (exists,): (bool,) = sqlx::query_as(
        r"SELECT EXISTS (
              SELECT 1 FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2
          )",
    )
    .bind(user_id.into_inner())
    .bind(lesson_id.into_inner())
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// Count how many of the given lessons the user has completed.
///
/// Used for the course-completion check: a course is complete when every
/// one of its lessons is.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn completed_lessons_among(
    conn: &mut PgConnection,
    user_id: UserId,
    lesson_ids: &[LessonId],
) -> Result<i64, DbError> {
    let ids: Vec<Uuid> = lesson_ids.iter().map(|id| id.into_inner()).collect();
    let (count,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(*)
          FROM lesson_progress
          WHERE user_id = $1 AND lesson_id = ANY($2)",
    )
    .bind(user_id.into_inner())
    .bind(&ids)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Mark a course complete. Returns `false` if it was already complete.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn complete_course(
    conn: &mut PgConnection,
    user_id: UserId,
    course_id: CourseId,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        r"INSERT INTO course_progress (user_id, course_id)
          VALUES ($1, $2)
          ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id.into_inner())
    .bind(course_id.into_inner())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark a content block complete for the user. Idempotent.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn complete_block(
    conn: &mut PgConnection,
    user_id: UserId,
    block_id: ContentBlockId,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO block_progress (user_id, block_id)
          VALUES ($1, $2)
          ON CONFLICT (user_id, block_id) DO NOTHING",
    )
    .bind(user_id.into_inner())
    .bind(block_id.into_inner())
    .execute(conn)
    .await?;
    Ok(())
}

/// Count how many of the given blocks the user has completed.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn completed_blocks_among(
    conn: &mut PgConnection,
    user_id: UserId,
    block_ids: &[ContentBlockId],
) -> Result<i64, DbError> {
    let ids: Vec<Uuid> = block_ids.iter().map(|id| id.into_inner()).collect();
    let (count,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(*)
          FROM block_progress
          WHERE user_id = $1 AND block_id = ANY($2)",
    )
    .bind(user_id.into_inner())
    .bind(&ids)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
