//! Collaboration groups, shared goals and study sessions.
//!
//! Every group-scoped operation checks membership first and fails closed:
//! a missing membership row denies the operation, whatever the reason for
//! its absence.

use chrono::{DateTime, Utc};
use questline_core::clamp_progress;
use questline_db::{DbError, collab_store};
use questline_types::{
    CollabGoal, CollabGroup, GoalId, GoalProgress, GoalUpdate, GoalUpdateId, GroupId, GroupMember,
    GroupRole, SessionId, SessionReply, SessionResponse, SessionStatus, StudySession, UserId,
};

use crate::catalog::CourseCatalog;
use crate::engine::Engine;
use crate::error::EngineError;

fn validated_title(raw: &str, what: &str) -> Result<String, EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::ValidationFailed(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

impl<C: CourseCatalog> Engine<C> {
    /// Create a group with the caller as owner and first member.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationFailed`] for an empty name or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn create_group(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<CollabGroup, EngineError> {
        let name = validated_title(name, "group name")?;
        let group = CollabGroup {
            id: GroupId::new(),
            name,
            owner_id,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;
        collab_store::insert_group(&mut tx, &group).await?;
        collab_store::add_member(
            &mut tx,
            &GroupMember {
                group_id: group.id,
                user_id: owner_id,
                role: GroupRole::Owner,
                joined_at: group.created_at,
            },
        )
        .await?;
        tx.commit().await.map_err(DbError::from)?;

        tracing::info!(group_id = %group.id, owner_id = %owner_id, "Group created");
        Ok(group)
    }

    /// Add a member to a group. Owner-gated.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown groups,
    /// [`EngineError::PermissionDenied`] for non-owner callers,
    /// [`EngineError::PreconditionFailed`] if already a member, or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn add_member(
        &self,
        group_id: GroupId,
        caller: UserId,
        new_member: UserId,
    ) -> Result<GroupMember, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        self.require_group(&mut conn, group_id).await?;
        self.require_role(&mut conn, group_id, caller, GroupRole::Owner)
            .await?;

        let member = GroupMember {
            group_id,
            user_id: new_member,
            role: GroupRole::Member,
            joined_at: Utc::now(),
        };
        let inserted = collab_store::add_member(&mut conn, &member).await?;
        if !inserted {
            return Err(EngineError::PreconditionFailed(format!(
                "user {new_member} is already a member of group {group_id}"
            )));
        }
        Ok(member)
    }

    /// Remove a member. Owners can remove anyone; members can remove
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown groups or
    /// non-members, [`EngineError::PermissionDenied`] for callers without
    /// the right, or [`EngineError::Db`] on persistence failure.
    pub async fn remove_member(
        &self,
        group_id: GroupId,
        caller: UserId,
        target: UserId,
    ) -> Result<(), EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        let group = self.require_group(&mut conn, group_id).await?;

        if caller != target {
            self.require_role(&mut conn, group_id, caller, GroupRole::Owner)
                .await?;
        }
        if target == group.owner_id {
            return Err(EngineError::PermissionDenied(String::from(
                "the group owner cannot be removed",
            )));
        }

        let removed = collab_store::remove_member(&mut conn, group_id, target).await?;
        if !removed {
            return Err(EngineError::NotFound(format!(
                "membership of user {target} in group {group_id}"
            )));
        }
        Ok(())
    }

    /// Create a shared goal. Member-gated.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationFailed`] for an empty title or a
    /// non-positive target, [`EngineError::PermissionDenied`] for
    /// non-members, or [`EngineError::Db`] on persistence failure.
    pub async fn create_goal(
        &self,
        group_id: GroupId,
        caller: UserId,
        title: &str,
        target_value: i64,
    ) -> Result<CollabGoal, EngineError> {
        let title = validated_title(title, "goal title")?;
        if target_value <= 0 {
            return Err(EngineError::ValidationFailed(String::from(
                "goal target must be positive",
            )));
        }

        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        self.require_group(&mut conn, group_id).await?;
        self.require_member(&mut conn, group_id, caller).await?;

        let goal = CollabGoal {
            id: GoalId::new(),
            group_id,
            title,
            target_value,
            progress_value: 0,
            created_by: caller,
            created_at: Utc::now(),
        };
        collab_store::insert_goal(&mut conn, &goal).await?;
        Ok(goal)
    }

    /// Record an attributed progress delta against a goal.
    ///
    /// The raw signed delta is appended as-is; the goal's cached progress
    /// is recomputed clamped to [0, target] and persisted atomically with
    /// the delta. The row lock serializes concurrent contributors.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown goals,
    /// [`EngineError::PermissionDenied`] for non-members, or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn record_goal_progress(
        &self,
        goal_id: GoalId,
        caller: UserId,
        amount: i64,
        note: Option<String>,
    ) -> Result<GoalProgress, EngineError> {
        let mut tx = self.pool.pool().begin().await.map_err(DbError::from)?;

        let goal = collab_store::fetch_goal_for_update(&mut tx, goal_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("goal {goal_id}")))?;
        self.require_member(&mut tx, goal.group_id, caller).await?;

        let update = GoalUpdate {
            id: GoalUpdateId::new(),
            goal_id,
            user_id: caller,
            amount,
            note,
            created_at: Utc::now(),
        };
        collab_store::insert_goal_update(&mut tx, &update).await?;

        let progress_value = clamp_progress(goal.progress_value, amount, goal.target_value);
        collab_store::set_goal_progress(&mut tx, goal_id, progress_value).await?;
        tx.commit().await.map_err(DbError::from)?;

        tracing::info!(
            goal_id = %goal_id,
            user_id = %caller,
            amount,
            progress_value,
            "Goal progress recorded"
        );

        Ok(GoalProgress {
            update,
            goal: CollabGoal {
                progress_value,
                ..goal
            },
        })
    }

    /// Schedule a study session hosted by the caller. Member-gated.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationFailed`] for an empty title,
    /// [`EngineError::PermissionDenied`] for non-members, or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn create_session(
        &self,
        group_id: GroupId,
        caller: UserId,
        title: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<StudySession, EngineError> {
        let title = validated_title(title, "session title")?;

        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;
        self.require_group(&mut conn, group_id).await?;
        self.require_member(&mut conn, group_id, caller).await?;

        let session = StudySession {
            id: SessionId::new(),
            group_id,
            host_id: caller,
            title,
            scheduled_at,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
        };
        collab_store::insert_session(&mut conn, &session).await?;
        Ok(session)
    }

    /// Record the caller's reply to a session invitation. A later reply
    /// overwrites the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown sessions,
    /// [`EngineError::PermissionDenied`] for non-members,
    /// [`EngineError::PreconditionFailed`] for sessions no longer
    /// scheduled, or [`EngineError::Db`] on persistence failure.
    pub async fn respond_to_session(
        &self,
        session_id: SessionId,
        caller: UserId,
        reply: SessionReply,
    ) -> Result<SessionResponse, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;

        let session = collab_store::fetch_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("session {session_id}")))?;
        self.require_member(&mut conn, session.group_id, caller).await?;
        if session.status != SessionStatus::Scheduled {
            return Err(EngineError::PreconditionFailed(format!(
                "session {session_id} is no longer scheduled"
            )));
        }

        let response = SessionResponse {
            session_id,
            user_id: caller,
            reply,
            responded_at: Utc::now(),
        };
        collab_store::upsert_response(&mut conn, &response).await?;
        Ok(response)
    }

    /// Cancel a scheduled session. Host- or owner-gated.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown sessions,
    /// [`EngineError::PermissionDenied`] for other callers, or
    /// [`EngineError::Db`] on persistence failure.
    pub async fn cancel_session(
        &self,
        session_id: SessionId,
        caller: UserId,
    ) -> Result<(), EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(DbError::from)?;

        let session = collab_store::fetch_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("session {session_id}")))?;
        if session.host_id != caller {
            self.require_role(&mut conn, session.group_id, caller, GroupRole::Owner)
                .await?;
        }

        collab_store::set_session_status(&mut conn, session_id, SessionStatus::Cancelled).await?;
        Ok(())
    }

    async fn require_group(
        &self,
        conn: &mut sqlx::PgConnection,
        group_id: GroupId,
    ) -> Result<CollabGroup, EngineError> {
        collab_store::fetch_group(&mut *conn, group_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("group {group_id}")))
    }

    async fn require_member(
        &self,
        conn: &mut sqlx::PgConnection,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<GroupRole, EngineError> {
        collab_store::member_role(&mut *conn, group_id, user_id)
            .await?
            .ok_or_else(|| {
                EngineError::PermissionDenied(format!(
                    "user {user_id} is not a member of group {group_id}"
                ))
            })
    }

    async fn require_role(
        &self,
        conn: &mut sqlx::PgConnection,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<(), EngineError> {
        let actual = self.require_member(&mut *conn, group_id, user_id).await?;
        if actual == role {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied(format!(
                "user {user_id} lacks the {role:?} role in group {group_id}"
            )))
        }
    }
}
