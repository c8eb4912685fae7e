//! Pure gamification domain logic for the Questline platform.
//!
//! Everything in this crate is deterministic and free of I/O: the level
//! curve, the streak state machine, badge requirement predicates, rank
//! assignment, goal clamping, and calendar period boundaries. The engine
//! crate wires these into database transactions; the same functions also
//! serve display-only reads, so live grants and profile views can never
//! disagree.
//!
//! # Modules
//!
//! - [`level`] -- Geometric level curve (`floor(100 * 1.5^(L-1))`)
//! - [`streak`] -- Calendar-day streak state machine with milestones
//! - [`badges`] -- Badge requirement predicates over a stats snapshot
//! - [`rank`] -- Dense 1-based rank assignment for leaderboard snapshots
//! - [`goal`] -- Clamped progress arithmetic for collaboration goals
//! - [`period`] -- Week/month boundaries in a configured UTC offset
//! - [`config`] -- Typed YAML configuration loading

pub mod badges;
pub mod config;
pub mod goal;
pub mod level;
pub mod period;
pub mod rank;
pub mod streak;

pub use badges::{ProfileStats, requirement_met};
pub use config::{
    ConfigError, GamificationConfig, InfrastructureConfig, LeaderboardConfig, LoggingConfig,
    QuestlineConfig, ServerConfig,
};
pub use goal::clamp_progress;
pub use level::{cumulative_xp_for_level, level_progress, xp_for_level};
pub use period::{local_date, month_start, offset_from_minutes, week_start};
pub use rank::{RankedUser, ScoredUser, rank_descending};
pub use streak::{STREAK_MILESTONE_DAYS, StreakAdvance, StreakState, advance};
