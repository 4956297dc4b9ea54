//! Implementation of the `tierwise init` command.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator};
use crate::domain::models::EngineConfig;

const CONFIG_FILE: &str = "config.yaml";

pub async fn execute(force: bool, json_mode: bool) -> Result<()> {
    let target_path = std::env::current_dir().context("Failed to get current directory")?;
    let tierwise_dir = target_path.join(".tierwise");

    if tierwise_dir.exists() && !force {
        emit(
            json_mode,
            false,
            "Project already initialized. Use --force to reinitialize.",
            &tierwise_dir,
        );
        return Ok(());
    }

    if force && tierwise_dir.exists() {
        fs::remove_dir_all(&tierwise_dir)
            .await
            .context("Failed to remove existing .tierwise directory")?;
    }

    fs::create_dir_all(&tierwise_dir)
        .await
        .with_context(|| format!("Failed to create {}", tierwise_dir.display()))?;

    // Seed a config file holding all defaults so operators can edit in place
    let config_path = tierwise_dir.join(CONFIG_FILE);
    let config_yaml = serde_yaml::to_string(&EngineConfig::default())
        .context("Failed to serialize default configuration")?;
    fs::write(&config_path, config_yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let db_path = tierwise_dir.join("tierwise.db");
    let db_url = format!("sqlite:{}", db_path.display());
    let pool = create_pool(&db_url, 1).await.context("Failed to create database")?;
    Migrator::new(pool)
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;

    let message = if force {
        "Project reinitialized successfully."
    } else {
        "Project initialized successfully."
    };
    emit(json_mode, true, message, &tierwise_dir);
    Ok(())
}

fn emit(json_mode: bool, success: bool, message: &str, dir: &Path) {
    if json_mode {
        let payload = serde_json::json!({
            "success": success,
            "message": message,
            "initialized_path": dir,
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
    } else {
        println!("{message}");
        if success {
            println!("  Config: {}", dir.join(CONFIG_FILE).display());
            println!("  Database: {}", dir.join("tierwise.db").display());
        }
    }
}
