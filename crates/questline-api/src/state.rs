//! Shared application state for the gamification API server.
//!
//! [`AppState`] holds the rules engine behind an [`Arc`] so every handler
//! shares one connection pool and one configuration snapshot. All request
//! work goes through the engine; the API layer itself holds no business
//! state.

use questline_engine::{Engine, PgCatalog};

/// Shared state for the Axum application, injected via the `State`
/// extractor.
pub struct AppState {
    /// The gamification rules engine, catalog-backed by `PostgreSQL`.
    pub engine: Engine<PgCatalog>,
}

impl AppState {
    /// Wrap an engine for sharing across handlers.
    pub const fn new(engine: Engine<PgCatalog>) -> Self {
        Self { engine }
    }
}
