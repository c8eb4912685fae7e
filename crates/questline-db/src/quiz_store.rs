//! Persistence for the append-only quiz attempt history.

use questline_types::{ContentBlockId, QuizAttempt, UserId};
use sqlx::PgConnection;

use crate::error::DbError;

/// Append one attempt to the history.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert_attempt(conn: &mut PgConnection, attempt: &QuizAttempt) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO quiz_attempts
              (id, user_id, block_id, score, max_score, is_passed, time_spent_secs, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(attempt.id.into_inner())
    .bind(attempt.user_id.into_inner())
    .bind(attempt.block_id.into_inner())
    .bind(attempt.score)
    .bind(attempt.max_score)
    .bind(attempt.is_passed)
    .bind(i32::try_from(attempt.time_spent_secs).unwrap_or(i32::MAX))
    .bind(attempt.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Whether the user already has a passing attempt for this quiz block.
///
/// Quiz XP is granted on the first pass per block; later passes earn
/// nothing.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn has_passed(
    conn: &mut PgConnection,
    user_id: UserId,
    block_id: ContentBlockId,
) -> Result<bool, DbError> {
    let (exists,): (bool,) = sqlx::query_as(
        r"SELECT EXISTS (
              SELECT 1 FROM quiz_attempts
              WHERE user_id = $1 AND block_id = $2 AND is_passed
          )",
    )
    .bind(user_id.into_inner())
    .bind(block_id.into_inner())
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// Count how many of the given quiz blocks the user has answered
/// perfectly at least once.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn perfect_blocks_among(
    conn: &mut PgConnection,
    user_id: UserId,
    block_ids: &[ContentBlockId],
) -> Result<i64, DbError> {
    let ids: Vec<uuid::Uuid> = block_ids.iter().map(|id| id.into_inner()).collect();
    let (count,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(DISTINCT block_id)
          FROM quiz_attempts
          WHERE user_id = $1 AND block_id = ANY($2)
            AND max_score > 0 AND score >= max_score",
    )
    .bind(user_id.into_inner())
    .bind(&ids)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Count the distinct quiz blocks this user has ever answered perfectly.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn perfect_quiz_count(conn: &mut PgConnection, user_id: UserId) -> Result<i64, DbError> {
    let (count,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(DISTINCT block_id)
          FROM quiz_attempts
          WHERE user_id = $1 AND max_score > 0 AND score >= max_score",
    )
    .bind(user_id.into_inner())
    .fetch_one(conn)
    .await?;
    Ok(count)
}
