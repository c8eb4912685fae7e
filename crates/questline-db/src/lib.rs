//! Data layer for the Questline gamification platform (`PostgreSQL`).
//!
//! `PostgreSQL` holds everything: the append-only XP ledger, the cached
//! game profile projection, badge definitions and awards, materialized
//! leaderboard snapshots, completion markers, the quiz attempt history,
//! and the collaboration records.
//!
//! Store modules expose free async functions over `&mut PgConnection`
//! rather than methods on a pool handle, so the engine can compose
//! several store calls inside one transaction:
//!
//! ```text
//! Engine transaction
//!     |-- profile_store::fetch_for_update  (row lock)
//!     |-- ledger_store::insert             (append XP entry)
//!     |-- profile_store::update_xp         (cached aggregate)
//!     +-- commit
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration and migrations
//! - [`profile_store`] -- cached per-user game profile projection
//! - [`ledger_store`] -- append-only XP transactions
//! - [`badge_store`] -- badge catalog and per-user awards
//! - [`quiz_store`] -- append-only quiz attempt history
//! - [`progress_store`] -- lesson/block/course completion markers
//! - [`catalog_store`] -- course structure read model
//! - [`leaderboard_store`] -- materialized snapshots and their sources
//! - [`collab_store`] -- groups, shared goals and study sessions
//! - [`user_store`] -- display identity read model
//! - [`convert`] -- enum <-> database string conversions
//! - [`error`] -- shared error types

pub mod badge_store;
pub mod catalog_store;
pub mod collab_store;
pub mod convert;
pub mod error;
pub mod ledger_store;
pub mod leaderboard_store;
pub mod postgres;
pub mod profile_store;
pub mod progress_store;
pub mod quiz_store;
pub mod user_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
