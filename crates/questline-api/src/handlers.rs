//! REST endpoint handlers for the gamification API.
//!
//! All handlers delegate to the rules engine via [`AppState`]; the API
//! layer only parses identity, validates payloads, and maps errors onto
//! HTTP statuses.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/health` | Liveness check |
//! | `GET` | `/api/profile` | The caller's game profile |
//! | `GET` | `/api/profile/gamification` | Full gamification view |
//! | `POST` | `/api/lessons/{id}/complete` | Record a lesson completion |
//! | `POST` | `/api/quizzes/{block_id}/attempts` | Record a quiz attempt |
//! | `GET` | `/api/leaderboards` | List the leaderboard catalog |
//! | `GET` | `/api/leaderboards/{id}` | One leaderboard page |
//! | `POST` | `/api/admin/leaderboards/refresh` | Recompute all snapshots |
//! | `POST` | `/api/groups` | Create a study group |
//! | `POST` | `/api/groups/{id}/members` | Add a member (owner only) |
//! | `DELETE` | `/api/groups/{id}/members/{user_id}` | Remove a member |
//! | `POST` | `/api/groups/{id}/goals` | Create a shared goal |
//! | `POST` | `/api/goals/{id}/progress` | Record goal progress |
//! | `POST` | `/api/groups/{id}/sessions` | Schedule a study session |
//! | `POST` | `/api/sessions/{id}/respond` | Accept or decline a session |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Utc};
use questline_types::{
    ContentBlockId, GoalId, GroupId, LeaderboardId, LessonId, SessionId, SessionReply, UserId,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body for `POST /api/quizzes/{block_id}/attempts`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct QuizAttemptRequest {
    /// Achieved score.
    #[validate(range(min = 0))]
    pub score: i64,
    /// Maximum achievable score for this quiz.
    #[validate(range(min = 1))]
    pub max_score: i64,
    /// Seconds spent on the attempt.
    pub time_spent_secs: u32,
}

/// Body for `POST /api/groups`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateGroupRequest {
    /// Group display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Body for `POST /api/groups/{id}/members`.
#[derive(Debug, serde::Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Uuid,
}

/// Body for `POST /api/groups/{id}/goals`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateGoalRequest {
    /// Goal title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Target the group is working toward. Must be positive.
    #[validate(range(min = 1))]
    pub target_value: i64,
}

/// Body for `POST /api/goals/{id}/progress`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct GoalProgressRequest {
    /// Signed progress delta.
    pub amount: i64,
    /// Optional note attached to the update.
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Body for `POST /api/groups/{id}/sessions`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// Session title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// When the session is scheduled to start.
    pub scheduled_at: DateTime<Utc>,
}

/// Body for `POST /api/sessions/{id}/respond`.
#[derive(Debug, serde::Deserialize)]
pub struct SessionResponseRequest {
    /// The caller's reply.
    pub reply: SessionReply,
}

fn validated<T: Validate>(payload: T) -> Result<T, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the API surface.
#[allow(clippy::unused_async)] // Axum handlers must be async.
pub async fn index() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Questline API</title>
    <style>
        body {
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }
        h1 { color: #58a6ff; margin-bottom: 0.25rem; }
        .subtitle { color: #8b949e; margin-top: 0; }
        a { color: #58a6ff; text-decoration: none; }
        a:hover { text-decoration: underline; }
        ul { list-style: none; padding: 0; }
        li { padding: 0.3rem 0; }
        code { color: #7ee787; }
        .status { color: #3fb950; font-weight: bold; }
        hr { border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }
    </style>
</head>
<body>
    <h1>Questline API</h1>
    <p class="subtitle">Gamification and leaderboard engine</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <hr>

    <h2>Endpoints</h2>
    <ul>
        <li><code>GET</code> <a href="/api/health">/api/health</a> -- Liveness check</li>
        <li><code>GET</code> /api/profile -- The caller's game profile</li>
        <li><code>GET</code> /api/profile/gamification -- Full gamification view</li>
        <li><code>POST</code> /api/lessons/{id}/complete -- Record a lesson completion</li>
        <li><code>POST</code> /api/quizzes/{block_id}/attempts -- Record a quiz attempt</li>
        <li><code>GET</code> /api/leaderboards -- List the leaderboard catalog</li>
        <li><code>GET</code> /api/leaderboards/{id} -- One leaderboard page</li>
        <li><code>POST</code> /api/groups -- Create a study group</li>
    </ul>

    <p>Identity is forwarded by the auth proxy via <code>x-user-id</code>
    and <code>x-user-role</code> headers.</p>
</body>
</html>"#,
    )
}

/// Liveness check.
#[allow(clippy::unused_async)] // Axum handlers must be async.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Return the caller's game profile, creating it on first sight.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.engine.get_user_profile(user_id).await?;
    Ok(Json(profile))
}

/// Return the caller's full gamification view: profile, badges, recent
/// transactions, and the recomputed level breakdown.
pub async fn get_gamification_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.engine.get_gamification_profile(user_id).await?;
    Ok(Json(view))
}

// ---------------------------------------------------------------------------
// Learning events
// ---------------------------------------------------------------------------

/// Record a lesson completion and return the gamification delta.
pub async fn complete_lesson(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .engine
        .on_lesson_completed(user_id, LessonId::from(lesson_id))
        .await?;
    Ok(Json(outcome))
}

/// Record a quiz attempt against a content block.
pub async fn record_quiz_attempt(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(block_id): Path<Uuid>,
    Json(payload): Json<QuizAttemptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(payload)?;
    let outcome = state
        .engine
        .on_quiz_attempt(
            user_id,
            ContentBlockId::from(block_id),
            payload.score,
            payload.max_score,
            payload.time_spent_secs,
        )
        .await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// List the leaderboard catalog.
pub async fn list_leaderboards(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let boards = state.engine.list_leaderboards().await?;
    Ok(Json(boards))
}

/// Return one leaderboard page with the caller's own placement.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .engine
        .get_leaderboard(LeaderboardId::from(id), user_id)
        .await?;
    Ok(Json(view))
}

/// Recompute all leaderboard snapshots. Admin-only; intended to be
/// driven by an external scheduler.
pub async fn refresh_leaderboards(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.engine.update_all_leaderboards().await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Collaboration
// ---------------------------------------------------------------------------

/// Create a study group owned by the caller.
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(payload)?;
    let group = state.engine.create_group(user_id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Add a member to a group. Owner only.
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .engine
        .add_member(
            GroupId::from(group_id),
            caller,
            UserId::from(payload.user_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Remove a member from a group. The owner may remove anyone but
/// themselves; members may remove themselves.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path((group_id, target)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .engine
        .remove_member(GroupId::from(group_id), caller, UserId::from(target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a shared goal in a group. Member-gated.
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(payload)?;
    let goal = state
        .engine
        .create_goal(
            GroupId::from(group_id),
            caller,
            &payload.title,
            payload.target_value,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// Record an attributed progress delta against a goal. Member-gated.
pub async fn record_goal_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<GoalProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(payload)?;
    let progress = state
        .engine
        .record_goal_progress(GoalId::from(goal_id), caller, payload.amount, payload.note)
        .await?;
    Ok(Json(progress))
}

/// Schedule a study session in a group. Member-gated.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(payload)?;
    let session = state
        .engine
        .create_session(
            GroupId::from(group_id),
            caller,
            &payload.title,
            payload.scheduled_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Record the caller's reply to a session invitation. Member-gated.
pub async fn respond_to_session(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SessionResponseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .engine
        .respond_to_session(SessionId::from(session_id), caller, payload.reply)
        .await?;
    Ok(Json(response))
}
