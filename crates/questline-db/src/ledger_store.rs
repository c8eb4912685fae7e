//! Persistence for the append-only XP ledger.
//!
//! Ledger rows are inserted inside the same transaction that updates the
//! cached profile aggregate, and are never updated or deleted afterwards.

use chrono::{DateTime, Utc};
use questline_types::{UserId, XpTransaction, XpTransactionId};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::convert::{reason_from_db, reason_to_db, reference_kind_from_db, reference_kind_to_db};
use crate::error::DbError;

/// Database row for the `xp_transactions` table.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    amount: i64,
    reason: String,
    description: String,
    reference_id: Option<Uuid>,
    reference_kind: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<XpTransaction, DbError> {
        let reference_kind = self
            .reference_kind
            .as_deref()
            .map(reference_kind_from_db)
            .transpose()?;
        Ok(XpTransaction {
            id: XpTransactionId::from(self.id),
            user_id: UserId::from(self.user_id),
            amount: self.amount,
            reason: reason_from_db(&self.reason)?,
            description: self.description,
            reference_id: self.reference_id,
            reference_kind,
            created_at: self.created_at,
        })
    }
}

/// Append one transaction to the ledger.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert(conn: &mut PgConnection, tx: &XpTransaction) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO xp_transactions
              (id, user_id, amount, reason, description, reference_id, reference_kind, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(tx.id.into_inner())
    .bind(tx.user_id.into_inner())
    .bind(tx.amount)
    .bind(reason_to_db(tx.reason))
    .bind(&tx.description)
    .bind(tx.reference_id)
    .bind(tx.reference_kind.map(reference_kind_to_db))
    .bind(tx.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a user's most recent ledger entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored enum value is unknown.
pub async fn recent_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
    limit: i64,
) -> Result<Vec<XpTransaction>, DbError> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        r"SELECT id, user_id, amount, reason, description, reference_id, reference_kind, created_at
          FROM xp_transactions
          WHERE user_id = $1
          ORDER BY created_at DESC
          LIMIT $2",
    )
    .bind(user_id.into_inner())
    .bind(limit)
    .fetch_all(conn)
    .await?;

    rows.into_iter()
        .map(TransactionRow::into_transaction)
        .collect()
}

/// Sum a user's ledger amounts, clamped at zero.
///
/// This is the ledger-side source of truth for the cached
/// `user_game_profiles.total_xp` column; the two must agree after every
/// committed grant.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn total_for_user(conn: &mut PgConnection, user_id: UserId) -> Result<i64, DbError> {
    let (sum,): (i64,) = sqlx::query_as(
        r"SELECT GREATEST(COALESCE(SUM(amount), 0), 0)::BIGINT
          FROM xp_transactions
          WHERE user_id = $1",
    )
    .bind(user_id.into_inner())
    .fetch_one(conn)
    .await?;
    Ok(sum)
}
