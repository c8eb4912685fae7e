//! The Questline gamification rules engine.
//!
//! Composes the pure domain logic from `questline-core` with the store
//! functions from `questline-db` into the platform's operations: XP
//! grants through the ledger, daily streaks, badge evaluation, the
//! lesson/quiz completion pipeline, leaderboard recomputation, and
//! collaboration.
//!
//! # Transactional shape
//!
//! Every record-append plus cached-aggregate mutation runs in one SQL
//! transaction, with the profile row lock serializing concurrent writers
//! per user. Badge evaluation runs after the causal commit on its own
//! connection; its failure degrades to an empty badge list.
//!
//! # Modules
//!
//! - [`engine`] -- the [`Engine`] handle shared by all operations
//! - [`catalog`] -- the course catalog seam ([`CourseCatalog`])
//! - [`ledger`] -- XP grants through the append-only ledger
//! - [`streak`] -- daily streak updates with milestone bonuses
//! - [`badges`] -- badge evaluation and awards
//! - [`profile`] -- profile reads and the aggregated view
//! - [`completion`] -- the lesson completion pipeline and quiz attempts
//! - [`leaderboards`] -- snapshot recomputation and reads
//! - [`collab`] -- groups, shared goals and study sessions
//! - [`error`] -- the caller-facing error taxonomy

pub mod badges;
pub mod catalog;
pub mod collab;
pub mod completion;
pub mod engine;
pub mod error;
pub mod leaderboards;
pub mod ledger;
pub mod profile;
pub mod streak;

pub use catalog::{CourseCatalog, MemoryCatalog, PgCatalog};
pub use engine::Engine;
pub use error::EngineError;
pub use leaderboards::{LeaderboardView, RefreshReport};
pub use ledger::AwardXp;
