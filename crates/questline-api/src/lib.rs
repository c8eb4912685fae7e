//! Gamification API server for the Questline platform.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Profile endpoints** for the caller's game profile and full
//!   gamification view (badges, recent ledger entries, level breakdown)
//! - **Learning-event endpoints** for lesson completions and quiz
//!   attempts, returning the resulting gamification delta
//! - **Leaderboard endpoints** plus an admin refresh hook for an
//!   external scheduler
//! - **Collaboration endpoints** for study groups, shared goals, and
//!   study sessions
//! - **Minimal HTML status page** (`GET /`) listing the API surface
//!
//! # Architecture
//!
//! Identity arrives as trusted headers from an upstream auth proxy and is
//! parsed by the extractors in [`auth`]. Every handler delegates to the
//! rules engine held in [`state::AppState`]; this crate owns no business
//! logic and no persistent state of its own.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
