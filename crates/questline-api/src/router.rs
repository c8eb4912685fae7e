//! Axum router construction for the gamification API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin frontend access and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the gamification API server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        // Profile
        .route("/api/profile", get(handlers::get_profile))
        .route(
            "/api/profile/gamification",
            get(handlers::get_gamification_profile),
        )
        // Learning events
        .route("/api/lessons/{id}/complete", post(handlers::complete_lesson))
        .route(
            "/api/quizzes/{block_id}/attempts",
            post(handlers::record_quiz_attempt),
        )
        // Leaderboards
        .route("/api/leaderboards", get(handlers::list_leaderboards))
        .route("/api/leaderboards/{id}", get(handlers::get_leaderboard))
        .route(
            "/api/admin/leaderboards/refresh",
            post(handlers::refresh_leaderboards),
        )
        // Collaboration
        .route("/api/groups", post(handlers::create_group))
        .route("/api/groups/{id}/members", post(handlers::add_member))
        .route(
            "/api/groups/{id}/members/{user_id}",
            delete(handlers::remove_member),
        )
        .route("/api/groups/{id}/goals", post(handlers::create_goal))
        .route("/api/goals/{id}/progress", post(handlers::record_goal_progress))
        .route("/api/groups/{id}/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/{id}/respond",
            post(handlers::respond_to_session),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
