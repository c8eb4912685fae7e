//! Persistence for materialized leaderboard snapshots.
//!
//! Each leaderboard's entries are fully replaced on refresh: delete the
//! old snapshot, batch-insert the new one via `UNNEST`, and stamp
//! `refreshed_at`, all inside the caller's transaction. Readers never see
//! a half-built snapshot.

use chrono::{DateTime, Utc};
use questline_core::{RankedUser, ScoredUser};
use questline_types::{
    Leaderboard, LeaderboardEntry, LeaderboardEntryId, LeaderboardId, LeaderboardKind, UserId,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::convert::{kind_from_db, kind_to_db};
use crate::error::DbError;

/// Fallback display name for users missing from the identity read model.
const UNKNOWN_USER: &str = "Unknown learner";

/// Database row for the `leaderboards` table.
#[derive(Debug, sqlx::FromRow)]
struct LeaderboardRow {
    id: Uuid,
    kind: String,
    name: String,
    refreshed_at: Option<DateTime<Utc>>,
}

impl LeaderboardRow {
    fn into_leaderboard(self) -> Result<Leaderboard, DbError> {
        Ok(Leaderboard {
            id: LeaderboardId::from(self.id),
            kind: kind_from_db(&self.kind)?,
            name: self.name,
            refreshed_at: self.refreshed_at,
        })
    }
}

/// Database row for the `leaderboard_entries` table.
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    leaderboard_id: Uuid,
    user_id: Uuid,
    score: i64,
    rank: i32,
    user_name: String,
    user_image: Option<String>,
}

impl EntryRow {
    fn into_entry(self) -> LeaderboardEntry {
        LeaderboardEntry {
            id: LeaderboardEntryId::from(self.id),
            leaderboard_id: LeaderboardId::from(self.leaderboard_id),
            user_id: UserId::from(self.user_id),
            score: self.score,
            rank: u32::try_from(self.rank).unwrap_or(0),
            user_name: self.user_name,
            user_image: self.user_image,
        }
    }
}

/// Create any missing leaderboard catalog rows.
///
/// Run at startup; inserting an already-present kind is a no-op, so the
/// call is safe to repeat.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if an insert fails.
pub async fn ensure_catalog(conn: &mut PgConnection) -> Result<(), DbError> {
    for kind in LeaderboardKind::ALL {
        sqlx::query(
            r"INSERT INTO leaderboards (id, kind, name)
              VALUES ($1, $2, $3)
              ON CONFLICT (kind) DO NOTHING",
        )
        .bind(LeaderboardId::new().into_inner())
        .bind(kind_to_db(kind))
        .bind(kind.display_name())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Fetch every leaderboard in the catalog.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored kind is unknown.
pub async fn list(conn: &mut PgConnection) -> Result<Vec<Leaderboard>, DbError> {
    let rows = sqlx::query_as::<_, LeaderboardRow>(
        r"SELECT id, kind, name, refreshed_at FROM leaderboards ORDER BY kind",
    )
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(LeaderboardRow::into_leaderboard).collect()
}

/// Fetch one leaderboard by id.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if the stored kind is unknown.
pub async fn fetch(
    conn: &mut PgConnection,
    id: LeaderboardId,
) -> Result<Option<Leaderboard>, DbError> {
    let row = sqlx::query_as::<_, LeaderboardRow>(
        r"SELECT id, kind, name, refreshed_at FROM leaderboards WHERE id = $1",
    )
    .bind(id.into_inner())
    .fetch_optional(conn)
    .await?;
    row.map(LeaderboardRow::into_leaderboard).transpose()
}

/// Replace a leaderboard's snapshot with freshly ranked entries.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if any statement fails.
pub async fn replace_entries(
    conn: &mut PgConnection,
    leaderboard_id: LeaderboardId,
    entries: &[RankedUser],
) -> Result<(), DbError> {
    sqlx::query(r"DELETE FROM leaderboard_entries WHERE leaderboard_id = $1")
        .bind(leaderboard_id.into_inner())
        .execute(&mut *conn)
        .await?;

    if !entries.is_empty() {
        let mut ids = Vec::with_capacity(entries.len());
        let mut user_ids = Vec::with_capacity(entries.len());
        let mut scores = Vec::with_capacity(entries.len());
        let mut ranks = Vec::with_capacity(entries.len());
        let mut names = Vec::with_capacity(entries.len());
        let mut images = Vec::with_capacity(entries.len());
        for entry in entries {
            ids.push(LeaderboardEntryId::new().into_inner());
            user_ids.push(entry.user_id.into_inner());
            scores.push(entry.score);
            ranks.push(i32::try_from(entry.rank).unwrap_or(i32::MAX));
            names.push(entry.user_name.clone());
            images.push(entry.user_image.clone());
        }

        sqlx::query(
            r"INSERT INTO leaderboard_entries
                  (id, leaderboard_id, user_id, score, rank, user_name, user_image)
              SELECT t.id, $2, t.user_id, t.score, t.rank, t.user_name, t.user_image
              FROM UNNEST($1::UUID[], $3::UUID[], $4::BIGINT[], $5::INT[], $6::TEXT[], $7::TEXT[])
                   AS t(id, user_id, score, rank, user_name, user_image)",
        )
        .bind(&ids)
        .bind(leaderboard_id.into_inner())
        .bind(&user_ids)
        .bind(&scores)
        .bind(&ranks)
        .bind(&names)
        .bind(&images)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query(r"UPDATE leaderboards SET refreshed_at = now() WHERE id = $1")
        .bind(leaderboard_id.into_inner())
        .execute(conn)
        .await?;

    Ok(())
}

/// Fetch the top page of a leaderboard's snapshot, ordered by rank.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn top_entries(
    conn: &mut PgConnection,
    leaderboard_id: LeaderboardId,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, DbError> {
    let rows = sqlx::query_as::<_, EntryRow>(
        r"SELECT id, leaderboard_id, user_id, score, rank, user_name, user_image
          FROM leaderboard_entries
          WHERE leaderboard_id = $1
          ORDER BY rank
          LIMIT $2",
    )
    .bind(leaderboard_id.into_inner())
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(EntryRow::into_entry).collect())
}

/// Fetch one user's entry in a leaderboard's snapshot, if present.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn entry_for(
    conn: &mut PgConnection,
    leaderboard_id: LeaderboardId,
    user_id: UserId,
) -> Result<Option<LeaderboardEntry>, DbError> {
    let row = sqlx::query_as::<_, EntryRow>(
        r"SELECT id, leaderboard_id, user_id, score, rank, user_name, user_image
          FROM leaderboard_entries
          WHERE leaderboard_id = $1 AND user_id = $2",
    )
    .bind(leaderboard_id.into_inner())
    .bind(user_id.into_inner())
    .fetch_optional(conn)
    .await?;
    Ok(row.map(EntryRow::into_entry))
}

// ---------------------------------------------------------------------------
// Snapshot sources
// ---------------------------------------------------------------------------

/// Raw scored row shared by the source queries below.
#[derive(Debug, sqlx::FromRow)]
struct SourceRow {
    user_id: Uuid,
    user_name: Option<String>,
    user_image: Option<String>,
    score: i64,
}

impl SourceRow {
    fn into_scored(self) -> ScoredUser {
        ScoredUser {
            user_id: UserId::from(self.user_id),
            user_name: self.user_name.unwrap_or_else(|| UNKNOWN_USER.to_owned()),
            user_image: self.user_image,
            score: self.score,
        }
    }
}

/// Top users by a profile column. `column` is one of a fixed set of
/// trusted identifiers, never caller input.
async fn source_profile_column(
    conn: &mut PgConnection,
    column: &str,
    limit: i64,
) -> Result<Vec<ScoredUser>, DbError> {
    let query = format!(
        "SELECT p.user_id, u.display_name AS user_name, u.image_url AS user_image,
                p.{column}::BIGINT AS score
         FROM user_game_profiles p
         LEFT JOIN users u ON u.id = p.user_id
         WHERE p.{column} > 0
         ORDER BY p.{column} DESC, p.user_id
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, SourceRow>(&query)
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(SourceRow::into_scored).collect())
}

/// Top users by lifetime XP.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn source_total_xp(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<ScoredUser>, DbError> {
    source_profile_column(conn, "total_xp", limit).await
}

/// Top users by current streak length.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn source_streak(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<ScoredUser>, DbError> {
    source_profile_column(conn, "current_streak", limit).await
}

/// Top users by courses completed.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn source_courses_completed(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<ScoredUser>, DbError> {
    source_profile_column(conn, "total_courses_completed", limit).await
}

/// Top users by XP earned since `since` (exclusive of earlier activity).
///
/// Sums ledger amounts inside the window; users whose window sum is zero
/// or negative are left out.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn source_xp_since(
    conn: &mut PgConnection,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<ScoredUser>, DbError> {
    let rows = sqlx::query_as::<_, SourceRow>(
        r"SELECT t.user_id, u.display_name AS user_name, u.image_url AS user_image,
                 SUM(t.amount)::BIGINT AS score
          FROM xp_transactions t
          LEFT JOIN users u ON u.id = t.user_id
          WHERE t.created_at >= $1
          GROUP BY t.user_id, u.display_name, u.image_url
          HAVING SUM(t.amount) > 0
          ORDER BY SUM(t.amount) DESC, t.user_id
          LIMIT $2",
    )
    .bind(since)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(SourceRow::into_scored).collect())
}
