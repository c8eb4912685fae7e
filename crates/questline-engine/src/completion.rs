//! The lesson completion pipeline and quiz attempt recording.
//!
//! One transaction covers the whole mutation chain; badge evaluation
//! happens after commit, on its own connection, and its failure degrades
//! to an empty badge list rather than failing the completion. The client
//! can refetch the profile to see badges a retry would surface.

use chrono::{DateTime, Utc};
use questline_db::{DbError, profile_store, progress_store, quiz_store};
use questline_types::{
    AwardedBadge, CompletionOutcome, ContentBlockId, CourseId, LessonId, LessonRef, QuizAttempt,
    QuizAttemptId, QuizOutcome, ReferenceKind, UserId, XpAward, XpReason,
};
use sqlx::PgConnection;

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::ledger::AwardXp;

/// Minimum fraction of `max_score` that counts as a pass, in tenths.
const PASS_THRESHOLD_TENTHS: i64 = 7;

/// Whether a score clears the passing bar (70% of maximum).
const fn is_passing(score: i64, max_score: i64) -> bool {
    score.saturating_mul(10) >= max_score.saturating_mul(PASS_THRESHOLD_TENTHS)
}

/// Running totals across the grants of one completion.
#[derive(Debug, Default)]
struct GrantTally {
    xp_earned: i64,
    leveled_up: bool,
    new_level: u32,
}

impl GrantTally {
    fn absorb(&mut self, award: Option<&XpAward>) {
        if let Some(award) = award {
            self.xp_earned = self.xp_earned.saturating_add(award.transaction.amount);
            self.leveled_up = self.leveled_up || award.leveled_up;
            self.new_level = self.new_level.max(award.new_level);
        }
    }
}

impl<C: CourseCatalog> Engine<C> {
    /// Record a lesson completion and apply every gamification effect.
    ///
    /// Pipeline order inside one transaction: idempotence check, gating
    /// precondition, streak update, base lesson XP, quiz performance
    /// bonus, counter bump, course-completion cascade. Badge evaluation
    /// follows the commit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for lessons the catalog does not
    /// know, [`EngineError::PreconditionFailed`] when required interactive
    /// blocks are incomplete, or [`EngineError::Db`] on persistence
    /// failure.
    pub async fn on_lesson_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<CompletionOutcome, EngineError> {
        let lesson = self
            .catalog
            .lesson_ref(lesson_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("lesson {lesson_id}")))?;

        let now = Utc::now();
        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;

        // Idempotence: a duplicate completion is a successful no-op.
        let first_completion =
            progress_store::complete_lesson(&mut tx, user_id, lesson_id).await?;
        if !first_completion {
            tx.rollback().await.map_err(DbError::from)?;
            tracing::debug!(user_id = %user_id, lesson_id = %lesson_id, "Duplicate lesson completion");
            let profile = self.get_user_profile(user_id).await?;
            return Ok(CompletionOutcome {
                already_completed: true,
                xp_earned: 0,
                leveled_up: false,
                new_level: profile.current_level,
                streak: None,
                badges_awarded: Vec::new(),
                course_completed: None,
            });
        }

        // Gating precondition: every required interactive block is done.
        if !lesson.required_block_ids.is_empty() {
            let done = progress_store::completed_blocks_among(
                &mut tx,
                user_id,
                &lesson.required_block_ids,
            )
            .await?;
            let required = i64::try_from(lesson.required_block_ids.len()).unwrap_or(i64::MAX);
            if done < required {
                return Err(EngineError::PreconditionFailed(format!(
                    "lesson {lesson_id} has {done} of {required} required blocks complete"
                )));
            }
        }

        let (streak, milestone_award) = self.update_streak_in(&mut tx, user_id, now).await?;

        let base_award = self
            .award_xp_in(
                &mut tx,
                AwardXp {
                    user_id,
                    amount: self.gamification.lesson_xp,
                    reason: XpReason::LessonCompleted,
                    description: format!("Completed lesson: {}", lesson.title),
                    reference_id: Some(lesson_id.into_inner()),
                    reference_kind: Some(ReferenceKind::Lesson),
                },
                now,
            )
            .await?;

        let bonus_award = self
            .lesson_performance_bonus_in(&mut tx, user_id, &lesson, now)
            .await?;

        profile_store::increment_lessons(&mut tx, user_id).await?;

        let course_award = self
            .complete_course_in(&mut tx, user_id, lesson.course_id, now)
            .await?;
        let course_completed = course_award.as_ref().map(|_| lesson.course_id);

        tx.commit().await.map_err(DbError::from)?;

        let mut tally = GrantTally::default();
        tally.absorb(milestone_award.as_ref());
        tally.absorb(base_award.as_ref());
        tally.absorb(bonus_award.as_ref());
        tally.absorb(course_award.as_ref());

        let badges_awarded = self.evaluate_badges_nonfatal(user_id).await;

        let new_level = if tally.new_level > 0 {
            tally.new_level
        } else {
            self.get_user_profile(user_id).await?.current_level
        };

        Ok(CompletionOutcome {
            already_completed: false,
            xp_earned: tally.xp_earned,
            leveled_up: tally.leveled_up,
            new_level,
            streak: Some(streak),
            badges_awarded,
            course_completed,
        })
    }

    /// Record a course completion directly, without a triggering lesson.
    ///
    /// Exists for administrative replays; the normal path is the cascade
    /// inside [`Engine::on_lesson_completed`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for courses the catalog does not
    /// know, [`EngineError::PreconditionFailed`] when lessons are still
    /// outstanding, or [`EngineError::Db`] on persistence failure.
    pub async fn on_course_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<CompletionOutcome, EngineError> {
        let lesson_ids = self.catalog.course_lesson_ids(course_id).await?;
        if lesson_ids.is_empty() {
            return Err(EngineError::NotFound(format!("course {course_id}")));
        }

        let now = Utc::now();
        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;

        let done = progress_store::completed_lessons_among(&mut tx, user_id, &lesson_ids).await?;
        let total = i64::try_from(lesson_ids.len()).unwrap_or(i64::MAX);
        if done < total {
            return Err(EngineError::PreconditionFailed(format!(
                "course {course_id} has {done} of {total} lessons complete"
            )));
        }

        let Some(award) = self.complete_course_in(&mut tx, user_id, course_id, now).await? else {
            tx.rollback().await.map_err(DbError::from)?;
            let profile = self.get_user_profile(user_id).await?;
            return Ok(CompletionOutcome {
                already_completed: true,
                xp_earned: 0,
                leveled_up: false,
                new_level: profile.current_level,
                streak: None,
                badges_awarded: Vec::new(),
                course_completed: None,
            });
        };

        tx.commit().await.map_err(DbError::from)?;
        let badges_awarded = self.evaluate_badges_nonfatal(user_id).await;

        Ok(CompletionOutcome {
            already_completed: false,
            xp_earned: award.transaction.amount,
            leveled_up: award.leveled_up,
            new_level: award.new_level,
            streak: None,
            badges_awarded,
            course_completed: Some(course_id),
        })
    }

    /// Record a quiz attempt and apply pass/perfect rewards.
    ///
    /// Attempts are append-only; XP is granted on the first pass per
    /// block, with a bonus when that attempt is perfect.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationFailed`] for malformed scores or
    /// non-quiz blocks, [`EngineError::NotFound`] for unknown blocks, or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn on_quiz_attempt(
        &self,
        user_id: UserId,
        block_id: ContentBlockId,
        score: i64,
        max_score: i64,
        time_spent_secs: u32,
    ) -> Result<QuizOutcome, EngineError> {
        if max_score <= 0 || score < 0 || score > max_score {
            return Err(EngineError::ValidationFailed(format!(
                "score {score} out of range for max {max_score}"
            )));
        }
        let (_, block) = self
            .catalog
            .block(block_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("content block {block_id}")))?;
        if !block.content.is_quiz() {
            return Err(EngineError::ValidationFailed(format!(
                "content block {block_id} is not a quiz"
            )));
        }

        let passed = is_passing(score, max_score);
        let perfect = score == max_score;
        let now = Utc::now();

        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;

        let already_passed = quiz_store::has_passed(&mut tx, user_id, block_id).await?;
        quiz_store::insert_attempt(
            &mut tx,
            &QuizAttempt {
                id: QuizAttemptId::new(),
                user_id,
                block_id,
                score,
                max_score,
                is_passed: passed,
                time_spent_secs,
                created_at: now,
            },
        )
        .await?;
        if passed {
            progress_store::complete_block(&mut tx, user_id, block_id).await?;
        }

        let mut tally = GrantTally::default();
        if passed && !already_passed {
            let quiz_award = self
                .award_xp_in(
                    &mut tx,
                    AwardXp {
                        user_id,
                        amount: self.gamification.quiz_xp,
                        reason: XpReason::QuizPassed,
                        description: String::from("Passed a quiz"),
                        reference_id: Some(block_id.into_inner()),
                        reference_kind: Some(ReferenceKind::ContentBlock),
                    },
                    now,
                )
                .await?;
            tally.absorb(quiz_award.as_ref());

            if perfect {
                let bonus = self
                    .award_xp_in(
                        &mut tx,
                        AwardXp {
                            user_id,
                            amount: self.gamification.perfect_quiz_bonus_xp,
                            reason: XpReason::PerformanceBonus,
                            description: String::from("Perfect quiz score"),
                            reference_id: Some(block_id.into_inner()),
                            reference_kind: Some(ReferenceKind::ContentBlock),
                        },
                        now,
                    )
                    .await?;
                tally.absorb(bonus.as_ref());
            }

            profile_store::increment_quizzes(&mut tx, user_id).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        let badges_awarded = if passed {
            self.evaluate_badges_nonfatal(user_id).await
        } else {
            Vec::new()
        };

        let new_level = if tally.new_level > 0 {
            tally.new_level
        } else {
            self.get_user_profile(user_id).await?.current_level
        };

        Ok(QuizOutcome {
            passed,
            perfect,
            xp_earned: tally.xp_earned,
            leveled_up: tally.leveled_up,
            new_level,
            badges_awarded,
        })
    }

    /// Grant the lesson performance bonus when every quiz block in the
    /// lesson has been answered perfectly at least once.
    async fn lesson_performance_bonus_in(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        lesson: &LessonRef,
        now: DateTime<Utc>,
    ) -> Result<Option<XpAward>, EngineError> {
        if lesson.quiz_block_ids.is_empty() {
            return Ok(None);
        }
        let perfect =
            quiz_store::perfect_blocks_among(&mut *conn, user_id, &lesson.quiz_block_ids).await?;
        let total = i64::try_from(lesson.quiz_block_ids.len()).unwrap_or(i64::MAX);
        if perfect < total {
            return Ok(None);
        }

        self.award_xp_in(
            &mut *conn,
            AwardXp {
                user_id,
                amount: self.gamification.perfect_quiz_bonus_xp,
                reason: XpReason::PerformanceBonus,
                description: format!("Perfect performance in: {}", lesson.title),
                reference_id: Some(lesson.lesson_id.into_inner()),
                reference_kind: Some(ReferenceKind::Lesson),
            },
            now,
        )
        .await
    }

    /// Mark a course complete and grant its XP when every lesson is done
    /// and the marker is new. Returns `None` when the course is still in
    /// progress or already credited.
    async fn complete_course_in(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<Option<XpAward>, EngineError> {
        let lesson_ids = self.catalog.course_lesson_ids(course_id).await?;
        if lesson_ids.is_empty() {
            return Ok(None);
        }
        let done = progress_store::completed_lessons_among(&mut *conn, user_id, &lesson_ids).await?;
        let total = i64::try_from(lesson_ids.len()).unwrap_or(i64::MAX);
        if done < total {
            return Ok(None);
        }

        let first = progress_store::complete_course(&mut *conn, user_id, course_id).await?;
        if !first {
            return Ok(None);
        }

        let award = self
            .award_xp_in(
                &mut *conn,
                AwardXp {
                    user_id,
                    amount: self.gamification.course_xp,
                    reason: XpReason::CourseCompleted,
                    description: String::from("Completed a course"),
                    reference_id: Some(course_id.into_inner()),
                    reference_kind: Some(ReferenceKind::Course),
                },
                now,
            )
            .await?;
        profile_store::increment_courses(&mut *conn, user_id).await?;

        Ok(award)
    }

    /// Run badge evaluation after a commit, degrading failure to an empty
    /// list.
    pub(crate) async fn evaluate_badges_nonfatal(&self, user_id: UserId) -> Vec<AwardedBadge> {
        match self.check_and_award_badges(user_id).await {
            Ok(badges) => badges,
            Err(error) => {
                tracing::warn!(user_id = %user_id, %error, "Badge evaluation failed after commit");
                Vec::new()
            }
        }
    }
}
