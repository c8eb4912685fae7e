//! Leaderboard recomputation and reads.
//!
//! Refresh is a full snapshot replacement per leaderboard, each in its
//! own transaction: a failure in one board never corrupts another, and a
//! reader sees either the previous snapshot or the new one. Leaderboards
//! are a bounded-staleness view by design; an external scheduler drives
//! the refresh endpoint.

use chrono::Utc;
use questline_core::{month_start, rank_descending, week_start};
use questline_db::{DbError, leaderboard_store};
use questline_types::{
    Leaderboard, LeaderboardEntry, LeaderboardId, LeaderboardKind, UserId,
};
use serde::Serialize;

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;

/// Outcome of one full refresh pass.
#[derive(Debug, Default, Serialize)]
pub struct RefreshReport {
    /// Kinds whose snapshot was replaced.
    pub refreshed: Vec<LeaderboardKind>,
    /// Kinds whose refresh failed; their previous snapshot is intact.
    pub failed: Vec<LeaderboardKind>,
}

/// A leaderboard page with the requester's own placement.
#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    /// The leaderboard.
    pub leaderboard: Leaderboard,
    /// The top page of the snapshot, ordered by rank.
    pub entries: Vec<LeaderboardEntry>,
    /// The requester's entry, present even when outside the top page.
    pub requester_entry: Option<LeaderboardEntry>,
}

impl<C: CourseCatalog> Engine<C> {
    /// Recompute every leaderboard snapshot.
    ///
    /// Failures are aggregated into the report rather than aborting the
    /// pass; each board refreshes in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] only if the catalog itself cannot be
    /// read.
    pub async fn update_all_leaderboards(&self) -> Result<RefreshReport, EngineError> {
        let boards = {
            let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
            leaderboard_store::ensure_catalog(&mut conn).await?;
            leaderboard_store::list(&mut conn).await?
        };

        let mut report = RefreshReport::default();
        for board in boards {
            match self.refresh_one(&board).await {
                Ok(()) => report.refreshed.push(board.kind),
                Err(error) => {
                    tracing::warn!(kind = ?board.kind, %error, "Leaderboard refresh failed");
                    report.failed.push(board.kind);
                }
            }
        }

        tracing::info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "Leaderboard refresh pass complete"
        );
        Ok(report)
    }

    async fn refresh_one(&self, board: &Leaderboard) -> Result<(), EngineError> {
        let now = Utc::now();
        let offset = self.gamification.utc_offset();
        let limit = i64::from(self.leaderboards.snapshot_size);

        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;
        let scored = match board.kind {
            LeaderboardKind::AllTimeXp => {
                leaderboard_store::source_total_xp(&mut tx, limit).await?
            }
            LeaderboardKind::WeeklyXp => {
                leaderboard_store::source_xp_since(&mut tx, week_start(now, offset), limit).await?
            }
            LeaderboardKind::MonthlyXp => {
                leaderboard_store::source_xp_since(&mut tx, month_start(now, offset), limit)
                    .await?
            }
            LeaderboardKind::Streak => leaderboard_store::source_streak(&mut tx, limit).await?,
            LeaderboardKind::CoursesCompleted => {
                leaderboard_store::source_courses_completed(&mut tx, limit).await?
            }
        };

        let ranked = rank_descending(scored);
        leaderboard_store::replace_entries(&mut tx, board.id, &ranked).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    /// List the leaderboard catalog, ordered by kind.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] on persistence failure.
    pub async fn list_leaderboards(&self) -> Result<Vec<Leaderboard>, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        Ok(leaderboard_store::list(&mut conn).await?)
    }

    /// Read a leaderboard's top page plus the requester's own placement.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown leaderboards or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn get_leaderboard(
        &self,
        id: LeaderboardId,
        requester: UserId,
    ) -> Result<LeaderboardView, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;

        let leaderboard = leaderboard_store::fetch(&mut conn, id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("leaderboard {id}")))?;
        let entries =
            leaderboard_store::top_entries(&mut conn, id, i64::from(self.leaderboards.page_size))
                .await?;
        let requester_entry = leaderboard_store::entry_for(&mut conn, id, requester).await?;

        Ok(LeaderboardView {
            leaderboard,
            entries,
            requester_entry,
        })
    }
}
