//! Daily streak updates.
//!
//! The pure state machine lives in `questline-core`; this module wires it
//! to the stored profile and grants milestone XP through the ledger
//! inside the same transaction as the streak write.

use chrono::{DateTime, Utc};
use questline_core::{StreakState, advance, local_date};
use questline_db::{DbError, profile_store};
use questline_types::{StreakOutcome, UserId, XpAward, XpReason};
use sqlx::PgConnection;

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::ledger::AwardXp;

impl<C: CourseCatalog> Engine<C> {
    /// Record qualifying activity for today in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub async fn update_streak(&self, user_id: UserId) -> Result<StreakOutcome, EngineError> {
        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;
        let (outcome, _) = self.update_streak_in(&mut tx, user_id, Utc::now()).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(outcome)
    }

    /// Record qualifying activity inside the caller's transaction.
    ///
    /// Returns the streak outcome plus the milestone grant, when the new
    /// length landed on a milestone. Same-day repeats change nothing and
    /// grant nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub(crate) async fn update_streak_in(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(StreakOutcome, Option<XpAward>), EngineError> {
        let profile = profile_store::fetch_for_update(&mut *conn, user_id).await?;

        let offset = self.gamification.utc_offset();
        let today = local_date(now, offset);
        let state = StreakState {
            current: profile.current_streak,
            longest: profile.longest_streak,
            last_activity: profile.last_activity_at.map(|at| local_date(at, offset)),
        };
        let advanced = advance(&state, today);

        if advanced.changed {
            profile_store::update_streak(
                &mut *conn,
                user_id,
                advanced.current,
                advanced.longest,
                now,
            )
            .await?;
            tracing::info!(
                user_id = %user_id,
                current_streak = advanced.current,
                longest_streak = advanced.longest,
                is_new_record = advanced.is_new_record,
                "Streak updated"
            );
        }

        let milestone_award = if let Some(days) = advanced.milestone {
            self.award_xp_in(
                &mut *conn,
                AwardXp {
                    user_id,
                    amount: self.gamification.streak_milestone_xp,
                    reason: XpReason::StreakMilestone,
                    description: format!("{days}-day streak milestone"),
                    reference_id: None,
                    reference_kind: None,
                },
                now,
            )
            .await?
        } else {
            None
        };

        Ok((
            StreakOutcome {
                current_streak: advanced.current,
                longest_streak: advanced.longest,
                is_new_record: advanced.is_new_record,
            },
            milestone_award,
        ))
    }
}
