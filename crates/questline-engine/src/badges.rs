//! Badge evaluation and awards.
//!
//! Evaluation runs after the causal mutation commits, so predicates
//! observe the updated counters. Most stats come straight from the
//! profile snapshot; the perfect-quiz count is resolved lazily with one
//! query, and only when some unearned badge actually checks it.

use std::collections::HashSet;

use chrono::Utc;
use questline_core::{ProfileStats, requirement_met};
use questline_db::{DbError, badge_store, quiz_store};
use questline_types::{
    AwardedBadge, BadgeRequirement, ReferenceKind, UserBadge, UserBadgeId, UserId, XpReason,
};

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::ledger::AwardXp;

impl<C: CourseCatalog> Engine<C> {
    /// Evaluate every active unearned badge for a user and award the ones
    /// whose requirement is now met.
    ///
    /// Safe to call repeatedly and concurrently: the unique (user, badge)
    /// pair makes a lost race a silent no-op, and earned badges are
    /// skipped up front.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if persistence fails.
    pub async fn check_and_award_badges(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AwardedBadge>, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;

        let Some(profile) = questline_db::profile_store::fetch(&mut conn, user_id).await? else {
            return Ok(Vec::new());
        };

        let catalog = badge_store::active_badges(&mut conn).await?;
        let earned: HashSet<_> = badge_store::earned_ids(&mut conn, user_id)
            .await?
            .into_iter()
            .collect();

        let candidates: Vec<_> = catalog
            .into_iter()
            .filter(|badge| !earned.contains(&badge.id))
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut stats = ProfileStats {
            total_xp: profile.total_xp,
            level: profile.current_level,
            current_streak: profile.current_streak,
            lessons_completed: profile.total_lessons_completed,
            courses_completed: profile.total_courses_completed,
            quizzes_passed: profile.total_quizzes_passed,
            perfect_quizzes: 0,
        };
        if candidates
            .iter()
            .any(|badge| badge.requirement == BadgeRequirement::PerfectQuizzes)
        {
            let count = quiz_store::perfect_quiz_count(&mut conn, user_id).await?;
            stats.perfect_quizzes = u32::try_from(count).unwrap_or(u32::MAX);
        }
        drop(conn);

        // One transaction per badge: the award row and its XP reward
        // commit together, so a crash can never strand an earned badge
        // without its reward.
        let mut awarded = Vec::new();
        for badge in candidates {
            if !requirement_met(badge.requirement, badge.target_value, &stats) {
                continue;
            }

            let earned_at = Utc::now();
            let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;
            let inserted = badge_store::award(
                &mut tx,
                &UserBadge {
                    id: UserBadgeId::new(),
                    user_id,
                    badge_id: badge.id,
                    earned_at,
                    progress: stats.observed(badge.requirement),
                },
            )
            .await?;
            if !inserted {
                // Lost a race with a concurrent evaluation.
                tx.rollback().await.map_err(DbError::from)?;
                continue;
            }

            if badge.xp_reward > 0 {
                self.award_xp_in(
                    &mut tx,
                    AwardXp {
                        user_id,
                        amount: badge.xp_reward,
                        reason: XpReason::BadgeEarned,
                        description: format!("Earned badge: {}", badge.name),
                        reference_id: Some(badge.id.into_inner()),
                        reference_kind: Some(ReferenceKind::Badge),
                    },
                    earned_at,
                )
                .await?;
            }
            tx.commit().await.map_err(DbError::from)?;

            tracing::info!(
                user_id = %user_id,
                badge = %badge.name,
                requirement = ?badge.requirement,
                "Badge awarded"
            );

            awarded.push(AwardedBadge { badge, earned_at });
        }

        Ok(awarded)
    }
}
