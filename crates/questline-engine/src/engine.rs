//! The engine handle shared by all operation modules.

use questline_core::config::{GamificationConfig, LeaderboardConfig, QuestlineConfig};
use questline_db::PostgresPool;

use crate::catalog::CourseCatalog;

/// The gamification engine.
///
/// Holds the connection pool, the tuning knobs from configuration, and
/// the course catalog seam. Operation methods live in the sibling
/// modules; each multi-step mutation opens one transaction and the
/// profile row lock serializes concurrent writers per user.
pub struct Engine<C> {
    pub(crate) pool: PostgresPool,
    pub(crate) gamification: GamificationConfig,
    pub(crate) leaderboards: LeaderboardConfig,
    pub(crate) catalog: C,
}

impl<C: CourseCatalog> Engine<C> {
    /// Create an engine over a pool, configuration and catalog.
    pub fn new(pool: PostgresPool, config: &QuestlineConfig, catalog: C) -> Self {
        Self {
            pool,
            gamification: config.gamification.clone(),
            leaderboards: config.leaderboards.clone(),
            catalog,
        }
    }

    /// The underlying connection pool.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    /// The gamification tuning knobs.
    pub const fn gamification(&self) -> &GamificationConfig {
        &self.gamification
    }

    /// The course catalog seam.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }
}
