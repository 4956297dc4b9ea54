//! Command handlers for the `tierwise` CLI.

pub mod batch;
pub mod distribution;
pub mod init;
pub mod report;
pub mod speaker;

use anyhow::{Context, Result};

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator};
use crate::application::ProgressionEngine;
use crate::domain::models::EngineConfig;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration and wire an engine over the project database.
///
/// Migrations run on every open; an up-to-date database is a no-op.
pub(crate) async fn open_engine() -> Result<(ProgressionEngine, EngineConfig)> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;

    let database_url = format!("sqlite:{}", config.database.path);
    let pool = create_pool(&database_url, config.database.max_connections)
        .await
        .context("Failed to open database")?;

    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;

    let engine = ProgressionEngine::with_sqlite(pool, &config);
    Ok((engine, config))
}
