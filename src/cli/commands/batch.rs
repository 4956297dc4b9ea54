//! Implementation of the `tierwise batch` commands.

use anyhow::{Context, Result};

use crate::cli::output::progress::create_spinner;
use crate::cli::types::BatchCommands;
use crate::domain::models::Bucket;
use crate::domain::ports::ProfileFilter;

pub async fn execute(command: BatchCommands, json_mode: bool) -> Result<()> {
    match command {
        BatchCommands::Run { bucket, limit } => handle_run(bucket, limit, json_mode).await,
    }
}

async fn handle_run(bucket: Option<String>, limit: Option<i64>, json_mode: bool) -> Result<()> {
    let bucket = match bucket {
        Some(name) => Some(Bucket::from_str(&name).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid bucket: {name}. \
                 Must be one of: high_touch, medium_touch, low_touch, no_touch"
            )
        })?),
        None => None,
    };

    let (engine, _config) = super::open_engine().await?;

    let spinner = (!json_mode).then(|| {
        let spinner = create_spinner();
        spinner.set_message("Evaluating speakers...");
        spinner
    });

    let filter = ProfileFilter { bucket, exclude_halted: true, limit };
    let result = engine.evaluate_all(filter).await.context("Batch evaluation failed")?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Batch complete.");
        println!("  Evaluated: {}", result.evaluated);
        println!("  Promoted: {}", result.promoted);
        println!("  Demoted: {}", result.demoted);
        println!("  No change: {}", result.skipped);
        if result.failed > 0 {
            println!("  Failed: {}", result.failed);
        }
    }

    Ok(())
}
