//! Profile reads and the aggregated gamification view.

use std::collections::HashSet;

use questline_core::level_progress;
use questline_db::{DbError, badge_store, ledger_store, profile_store};
use questline_types::{GamificationProfile, UserGameProfile, UserId};

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;

impl<C: CourseCatalog> Engine<C> {
    /// Fetch a user's game profile, creating it on first read.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub async fn get_user_profile(&self, user_id: UserId) -> Result<UserGameProfile, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        profile_store::ensure(&mut conn, user_id).await?;
        profile_store::fetch(&mut conn, user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("game profile for user {user_id}")))
    }

    /// Assemble the full gamification view: profile, badge catalog
    /// partitioned into earned and locked, recent ledger entries, and the
    /// display level breakdown recomputed from the stored XP total.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub async fn get_gamification_profile(
        &self,
        user_id: UserId,
    ) -> Result<GamificationProfile, EngineError> {
        let profile = self.get_user_profile(user_id).await?;
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;

        let earned_badges = badge_store::earned_badges(&mut conn, user_id).await?;
        let earned_ids: HashSet<_> = earned_badges.iter().map(|a| a.badge.id).collect();
        let locked_badges = badge_store::active_badges(&mut conn)
            .await?
            .into_iter()
            .filter(|badge| !earned_ids.contains(&badge.id))
            .collect();

        let recent_transactions = ledger_store::recent_for_user(
            &mut conn,
            user_id,
            i64::from(self.gamification.recent_transactions),
        )
        .await?;

        // The cached level columns are written by the same code path, but
        // display always recomputes from the XP total.
        let level_progress = level_progress(profile.total_xp);

        Ok(GamificationProfile {
            profile,
            earned_badges,
            locked_badges,
            recent_transactions,
            level_progress,
        })
    }
}
