//! Persistence for the badge catalog and per-user awards.

use chrono::{DateTime, Utc};
use questline_types::{AwardedBadge, Badge, BadgeId, UserBadge, UserId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::convert::{
    category_from_db, category_to_db, rarity_from_db, rarity_to_db, requirement_from_db,
    requirement_to_db,
};
use crate::error::DbError;

/// Database row for the `badges` table.
#[derive(Debug, sqlx::FromRow)]
struct BadgeRow {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    requirement: String,
    target_value: i64,
    xp_reward: i64,
    rarity: String,
    is_active: bool,
    sort_order: i32,
}

impl BadgeRow {
    fn into_badge(self) -> Result<Badge, DbError> {
        Ok(Badge {
            id: BadgeId::from(self.id),
            name: self.name,
            description: self.description,
            category: category_from_db(&self.category)?,
            requirement: requirement_from_db(&self.requirement)?,
            target_value: self.target_value,
            xp_reward: self.xp_reward,
            rarity: rarity_from_db(&self.rarity)?,
            is_active: self.is_active,
            sort_order: self.sort_order,
        })
    }
}

/// Badge columns joined with the award timestamp for a specific user.
#[derive(Debug, sqlx::FromRow)]
struct AwardedRow {
    #[sqlx(flatten)]
    badge: BadgeRow,
    earned_at: DateTime<Utc>,
}

const BADGE_COLUMNS: &str = "id, name, description, category, requirement, target_value, \
                             xp_reward, rarity, is_active, sort_order";

/// Insert or update a badge definition. Used by seeding and admin tooling.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the upsert fails.
pub async fn upsert_badge(conn: &mut PgConnection, badge: &Badge) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO badges
              (id, name, description, category, requirement, target_value,
               xp_reward, rarity, is_active, sort_order)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
          ON CONFLICT (id) DO UPDATE
          SET name = EXCLUDED.name, description = EXCLUDED.description,
              category = EXCLUDED.category, requirement = EXCLUDED.requirement,
              target_value = EXCLUDED.target_value, xp_reward = EXCLUDED.xp_reward,
              rarity = EXCLUDED.rarity, is_active = EXCLUDED.is_active,
              sort_order = EXCLUDED.sort_order",
    )
    .bind(badge.id.into_inner())
    .bind(&badge.name)
    .bind(&badge.description)
    .bind(category_to_db(badge.category))
    .bind(requirement_to_db(badge.requirement))
    .bind(badge.target_value)
    .bind(badge.xp_reward)
    .bind(rarity_to_db(badge.rarity))
    .bind(badge.is_active)
    .bind(badge.sort_order)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch all active badge definitions in catalog order.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored enum value is unknown.
pub async fn active_badges(conn: &mut PgConnection) -> Result<Vec<Badge>, DbError> {
    let query = format!(
        "SELECT {BADGE_COLUMNS} FROM badges WHERE is_active ORDER BY sort_order, name"
    );
    let rows = sqlx::query_as::<_, BadgeRow>(&query).fetch_all(conn).await?;
    rows.into_iter().map(BadgeRow::into_badge).collect()
}

/// Fetch the set of badge ids a user has already earned.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn earned_ids(conn: &mut PgConnection, user_id: UserId) -> Result<Vec<BadgeId>, DbError> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as(r"SELECT badge_id FROM user_badges WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| BadgeId::from(id)).collect())
}

/// Fetch a user's earned badges with their definitions, newest first.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored enum value is unknown.
pub async fn earned_badges(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<AwardedBadge>, DbError> {
    let rows = sqlx::query_as::<_, AwardedRow>(
        r"SELECT b.id, b.name, b.description, b.category, b.requirement, b.target_value,
                 b.xp_reward, b.rarity, b.is_active, b.sort_order, ub.earned_at
          FROM user_badges ub
          JOIN badges b ON b.id = ub.badge_id
          WHERE ub.user_id = $1
          ORDER BY ub.earned_at DESC",
    )
    .bind(user_id.into_inner())
    .fetch_all(conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(AwardedBadge {
                badge: row.badge.into_badge()?,
                earned_at: row.earned_at,
            })
        })
        .collect()
}

/// Record a badge award. Returns `false` when the user already holds the
/// badge; the unique constraint makes re-awards a no-op.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn award(conn: &mut PgConnection, user_badge: &UserBadge) -> Result<bool, DbError> {
    let result = sqlx::query(
        r"INSERT INTO user_badges (id, user_id, badge_id, earned_at, progress)
          VALUES ($1, $2, $3, $4, $5)
          ON CONFLICT (user_id, badge_id) DO NOTHING",
    )
    .bind(user_badge.id.into_inner())
    .bind(user_badge.user_id.into_inner())
    .bind(user_badge.badge_id.into_inner())
    .bind(user_badge.earned_at)
    .bind(user_badge.progress)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
