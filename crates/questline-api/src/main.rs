//! Gamification API server entry point.
//!
//! Loads configuration, connects to `PostgreSQL`, runs migrations, seeds
//! the leaderboard catalog, and serves the HTTP API until terminated.

use std::path::Path;
use std::sync::Arc;

use questline_core::QuestlineConfig;
use questline_db::{PostgresConfig, PostgresPool};
use questline_engine::{Engine, PgCatalog};
use tracing::info;
use tracing_subscriber::EnvFilter;

use questline_api::{AppState, start_server};

/// Environment variable naming the configuration file.
const CONFIG_PATH_VAR: &str = "QUESTLINE_CONFIG";

/// Default configuration file path.
const DEFAULT_CONFIG_PATH: &str = "questline.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, database setup, or the server
/// itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));
    let config = QuestlineConfig::load_or_default(Path::new(&config_path))?;

    // Initialize structured logging; RUST_LOG overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!(config_path, "questline-api starting");

    let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
        .with_max_connections(config.infrastructure.max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;
    info!("database ready");

    let catalog = PgCatalog::new(pool.clone());
    let engine = Engine::new(pool, &config, catalog);

    // Seed the leaderboard catalog and compute initial snapshots so the
    // boards are never empty between startup and the first scheduled
    // refresh.
    let report = engine.update_all_leaderboards().await?;
    info!(
        refreshed = report.refreshed.len(),
        failed = report.failed.len(),
        "initial leaderboard snapshots computed"
    );

    let state = Arc::new(AppState::new(engine));
    start_server(&config.server, state).await?;

    Ok(())
}
