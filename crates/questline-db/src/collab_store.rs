//! Persistence for collaboration groups, shared goals and study sessions.

use chrono::{DateTime, Utc};
use questline_types::{
    CollabGoal, CollabGroup, GoalId, GoalUpdate, GoalUpdateId, GroupId, GroupMember, GroupRole,
    SessionId, SessionResponse, SessionStatus, StudySession, UserId,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::convert::{
    reply_from_db, reply_to_db, role_from_db, role_to_db, status_from_db, status_to_db,
};
use crate::error::DbError;

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> CollabGroup {
        CollabGroup {
            id: GroupId::from(self.id),
            name: self.name,
            owner_id: UserId::from(self.owner_id),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GoalRow {
    id: Uuid,
    group_id: Uuid,
    title: String,
    target_value: i64,
    progress_value: i64,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl GoalRow {
    fn into_goal(self) -> CollabGoal {
        CollabGoal {
            id: GoalId::from(self.id),
            group_id: GroupId::from(self.group_id),
            title: self.title,
            target_value: self.target_value,
            progress_value: self.progress_value,
            created_by: UserId::from(self.created_by),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    group_id: Uuid,
    host_id: Uuid,
    title: String,
    scheduled_at: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<StudySession, DbError> {
        Ok(StudySession {
            id: SessionId::from(self.id),
            group_id: GroupId::from(self.group_id),
            host_id: UserId::from(self.host_id),
            title: self.title,
            scheduled_at: self.scheduled_at,
            status: status_from_db(&self.status)?,
            created_at: self.created_at,
        })
    }
}

/// Insert a new group.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert_group(conn: &mut PgConnection, group: &CollabGroup) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO collab_groups (id, name, owner_id, created_at)
          VALUES ($1, $2, $3, $4)",
    )
    .bind(group.id.into_inner())
    .bind(&group.name)
    .bind(group.owner_id.into_inner())
    .bind(group.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a group by id.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn fetch_group(
    conn: &mut PgConnection,
    group_id: GroupId,
) -> Result<Option<CollabGroup>, DbError> {
    let row = sqlx::query_as::<_, GroupRow>(
        r"SELECT id, name, owner_id, created_at FROM collab_groups WHERE id = $1",
    )
    .bind(group_id.into_inner())
    .fetch_optional(conn)
    .await?;
    Ok(row.map(GroupRow::into_group))
}

/// Add a member to a group. Returns `false` if already a member.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn add_member(conn: &mut PgConnection, member: &GroupMember) -> Result<bool, DbError> {
    let result = sqlx::query(
        r"INSERT INTO group_members (group_id, user_id, role, joined_at)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (group_id, user_id) DO NOTHING",
    )
    .bind(member.group_id.into_inner())
    .bind(member.user_id.into_inner())
    .bind(role_to_db(member.role))
    .bind(member.joined_at)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a member from a group. Returns `false` if they were not a
/// member.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the delete fails.
pub async fn remove_member(
    conn: &mut PgConnection,
    group_id: GroupId,
    user_id: UserId,
) -> Result<bool, DbError> {
    let result =
        sqlx::query(r"DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id.into_inner())
            .bind(user_id.into_inner())
            .execute(conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Fetch a user's role within a group, if they are a member.
///
/// Membership checks fail closed: a `None` here means the caller must
/// deny the operation.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored role is unknown.
pub async fn member_role(
    conn: &mut PgConnection,
    group_id: GroupId,
    user_id: UserId,
) -> Result<Option<GroupRole>, DbError> {
    let row: Option<(String,)> =
        sqlx::query_as(r"SELECT role FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(conn)
            .await?;
    row.map(|(role,)| role_from_db(&role)).transpose()
}

/// Insert a new shared goal.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert_goal(conn: &mut PgConnection, goal: &CollabGoal) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO collab_goals
              (id, group_id, title, target_value, progress_value, created_by, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(goal.id.into_inner())
    .bind(goal.group_id.into_inner())
    .bind(&goal.title)
    .bind(goal.target_value)
    .bind(goal.progress_value)
    .bind(goal.created_by.into_inner())
    .bind(goal.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a goal by id.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn fetch_goal(
    conn: &mut PgConnection,
    goal_id: GoalId,
) -> Result<Option<CollabGoal>, DbError> {
    let row = sqlx::query_as::<_, GoalRow>(
        r"SELECT id, group_id, title, target_value, progress_value, created_by, created_at
          FROM collab_goals
          WHERE id = $1",
    )
    .bind(goal_id.into_inner())
    .fetch_optional(conn)
    .await?;
    Ok(row.map(GoalRow::into_goal))
}

/// Fetch a goal with a row lock, serializing concurrent progress writes.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn fetch_goal_for_update(
    conn: &mut PgConnection,
    goal_id: GoalId,
) -> Result<Option<CollabGoal>, DbError> {
    let row = sqlx::query_as::<_, GoalRow>(
        r"SELECT id, group_id, title, target_value, progress_value, created_by, created_at
          FROM collab_goals
          WHERE id = $1
          FOR UPDATE",
    )
    .bind(goal_id.into_inner())
    .fetch_optional(conn)
    .await?;
    Ok(row.map(GoalRow::into_goal))
}

/// Write a goal's cached clamped progress.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn set_goal_progress(
    conn: &mut PgConnection,
    goal_id: GoalId,
    progress_value: i64,
) -> Result<(), DbError> {
    sqlx::query(r"UPDATE collab_goals SET progress_value = $2 WHERE id = $1")
        .bind(goal_id.into_inner())
        .bind(progress_value)
        .execute(conn)
        .await?;
    Ok(())
}

/// Append an attributed progress delta.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert_goal_update(
    conn: &mut PgConnection,
    update: &GoalUpdate,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO goal_updates (id, goal_id, user_id, amount, note, created_at)
          VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(update.id.into_inner())
    .bind(update.goal_id.into_inner())
    .bind(update.user_id.into_inner())
    .bind(update.amount)
    .bind(&update.note)
    .bind(update.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a goal's update history, newest first.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn updates_for_goal(
    conn: &mut PgConnection,
    goal_id: GoalId,
    limit: i64,
) -> Result<Vec<GoalUpdate>, DbError> {
    let rows: Vec<(Uuid, Uuid, Uuid, i64, Option<String>, DateTime<Utc>)> = sqlx::query_as(
        r"SELECT id, goal_id, user_id, amount, note, created_at
          FROM goal_updates
          WHERE goal_id = $1
          ORDER BY created_at DESC
          LIMIT $2",
    )
    .bind(goal_id.into_inner())
    .bind(limit)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, goal_id, user_id, amount, note, created_at)| GoalUpdate {
                id: GoalUpdateId::from(id),
                goal_id: GoalId::from(goal_id),
                user_id: UserId::from(user_id),
                amount,
                note,
                created_at,
            },
        )
        .collect())
}

/// Insert a new study session.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the insert fails.
pub async fn insert_session(
    conn: &mut PgConnection,
    session: &StudySession,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO study_sessions (id, group_id, host_id, title, scheduled_at, status, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(session.id.into_inner())
    .bind(session.group_id.into_inner())
    .bind(session.host_id.into_inner())
    .bind(&session.title)
    .bind(session.scheduled_at)
    .bind(status_to_db(session.status))
    .bind(session.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch a session by id.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if the stored status is unknown.
pub async fn fetch_session(
    conn: &mut PgConnection,
    session_id: SessionId,
) -> Result<Option<StudySession>, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(
        r"SELECT id, group_id, host_id, title, scheduled_at, status, created_at
          FROM study_sessions
          WHERE id = $1",
    )
    .bind(session_id.into_inner())
    .fetch_optional(conn)
    .await?;
    row.map(SessionRow::into_session).transpose()
}

/// Write a session's lifecycle status.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the update fails.
pub async fn set_session_status(
    conn: &mut PgConnection,
    session_id: SessionId,
    status: SessionStatus,
) -> Result<(), DbError> {
    sqlx::query(r"UPDATE study_sessions SET status = $2 WHERE id = $1")
        .bind(session_id.into_inner())
        .bind(status_to_db(status))
        .execute(conn)
        .await?;
    Ok(())
}

/// Record or overwrite a member's reply to a session invitation.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the upsert fails.
pub async fn upsert_response(
    conn: &mut PgConnection,
    response: &SessionResponse,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO session_responses (session_id, user_id, reply, responded_at)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (session_id, user_id) DO UPDATE
          SET reply = EXCLUDED.reply, responded_at = EXCLUDED.responded_at",
    )
    .bind(response.session_id.into_inner())
    .bind(response.user_id.into_inner())
    .bind(reply_to_db(response.reply))
    .bind(response.responded_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Fetch every recorded reply to a session.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Decode`] if a stored reply is unknown.
pub async fn responses_for_session(
    conn: &mut PgConnection,
    session_id: SessionId,
) -> Result<Vec<SessionResponse>, DbError> {
    let rows: Vec<(Uuid, String, DateTime<Utc>)> = sqlx::query_as(
        r"SELECT user_id, reply, responded_at
          FROM session_responses
          WHERE session_id = $1
          ORDER BY responded_at",
    )
    .bind(session_id.into_inner())
    .fetch_all(conn)
    .await?;

    rows.into_iter()
        .map(|(user_id, reply, responded_at)| {
            Ok(SessionResponse {
                session_id,
                user_id: UserId::from(user_id),
                reply: reply_from_db(&reply)?,
                responded_at,
            })
        })
        .collect()
}
