//! Implementation of the `tierwise distribution` command.

use anyhow::{Context, Result};

use crate::cli::output::table::TableFormatter;
use crate::domain::models::Bucket;

pub async fn execute(json_mode: bool) -> Result<()> {
    let (engine, _config) = super::open_engine().await?;
    let distribution =
        engine.bucket_distribution().await.context("Failed to compute distribution")?;

    if json_mode {
        // Emit in worst-to-best order rather than hash order
        let ordered: Vec<_> = Bucket::all()
            .iter()
            .map(|bucket| {
                serde_json::json!({
                    "bucket": bucket,
                    "speakers": distribution.get(bucket).copied().unwrap_or(0),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&ordered)?);
    } else {
        println!("{}", TableFormatter::new().format_distribution(&distribution));
    }

    Ok(())
}
