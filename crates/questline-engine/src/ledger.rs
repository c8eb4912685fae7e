//! XP grants through the append-only ledger.
//!
//! Every grant appends one immutable transaction and updates the cached
//! profile aggregate in the same database transaction. The profile row
//! lock taken by the locked fetch serializes concurrent grants per user,
//! so the cached `total_xp` can never drift from the ledger sum.

use chrono::{DateTime, Utc};
use questline_core::level_progress;
use questline_db::{DbError, ledger_store, profile_store};
use questline_types::{
    ReferenceKind, UserId, XpAward, XpReason, XpTransaction, XpTransactionId,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;

/// Parameters for one XP grant.
#[derive(Debug, Clone)]
pub struct AwardXp {
    /// The user to credit (or debit, for corrections).
    pub user_id: UserId,
    /// Signed amount. Negative values are reserved for administrative
    /// corrections.
    pub amount: i64,
    /// The event kind producing this grant.
    pub reason: XpReason,
    /// Human-readable description for the activity feed.
    pub description: String,
    /// The entity that caused the grant, if any.
    pub reference_id: Option<Uuid>,
    /// What kind of entity `reference_id` names.
    pub reference_kind: Option<ReferenceKind>,
}

impl<C: CourseCatalog> Engine<C> {
    /// Grant XP in its own transaction.
    ///
    /// Returns `None` for zero amounts, which are logged no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub async fn award_xp(&self, params: AwardXp) -> Result<Option<XpAward>, EngineError> {
        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;
        let award = self.award_xp_in(&mut tx, params, Utc::now()).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(award)
    }

    /// Grant XP inside the caller's transaction.
    ///
    /// Locks the profile row, appends the ledger entry, recomputes the
    /// level breakdown from the clamped new total and writes the cached
    /// aggregate. The caller decides when to commit.
    ///
    /// A zero amount still appends its ledger entry -- the ledger is the
    /// audit log -- but skips the aggregate write and level math.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub(crate) async fn award_xp_in(
        &self,
        conn: &mut PgConnection,
        params: AwardXp,
        now: DateTime<Utc>,
    ) -> Result<Option<XpAward>, EngineError> {
        if params.amount == 0 {
            let transaction = XpTransaction {
                id: XpTransactionId::new(),
                user_id: params.user_id,
                amount: 0,
                reason: params.reason,
                description: params.description,
                reference_id: params.reference_id,
                reference_kind: params.reference_kind,
                created_at: now,
            };
            ledger_store::insert(&mut *conn, &transaction).await?;
            tracing::debug!(user_id = %params.user_id, reason = ?transaction.reason, "Zero XP grant logged");
            return Ok(None);
        }

        let profile = profile_store::fetch_for_update(&mut *conn, params.user_id).await?;

        let new_total = profile.total_xp.saturating_add(params.amount).max(0);
        let progress = level_progress(new_total);
        let leveled_up = progress.level > profile.current_level;

        let transaction = XpTransaction {
            id: XpTransactionId::new(),
            user_id: params.user_id,
            amount: params.amount,
            reason: params.reason,
            description: params.description,
            reference_id: params.reference_id,
            reference_kind: params.reference_kind,
            created_at: now,
        };
        ledger_store::insert(&mut *conn, &transaction).await?;
        profile_store::update_xp(
            &mut *conn,
            params.user_id,
            new_total,
            progress.level,
            progress.current_level_xp,
            progress.xp_to_next_level,
        )
        .await?;

        tracing::info!(
            user_id = %params.user_id,
            amount = params.amount,
            reason = ?transaction.reason,
            total_xp = new_total,
            level = progress.level,
            leveled_up,
            "XP granted"
        );

        let updated = questline_types::UserGameProfile {
            total_xp: new_total,
            current_level: progress.level,
            current_level_xp: progress.current_level_xp,
            xp_to_next_level: progress.xp_to_next_level,
            updated_at: now,
            ..profile
        };

        Ok(Some(XpAward {
            transaction,
            profile: updated,
            leveled_up,
            new_level: progress.level,
        }))
    }
}
