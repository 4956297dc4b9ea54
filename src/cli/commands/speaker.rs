//! Implementation of the `tierwise speaker` commands.

use anyhow::{Context, Result};
use console::style;
use uuid::Uuid;

use crate::cli::output::table::TableFormatter;
use crate::cli::types::SpeakerCommands;
use crate::domain::models::Decision;
use crate::services::OverrideMode;

pub async fn execute(command: SpeakerCommands, json_mode: bool) -> Result<()> {
    match command {
        SpeakerCommands::Show { speaker_id } => handle_show(speaker_id, json_mode).await,
        SpeakerCommands::History { speaker_id, page } => {
            handle_history(speaker_id, page, json_mode).await
        }
        SpeakerCommands::Evaluate { speaker_id, force_admit, force_block } => {
            handle_evaluate(speaker_id, force_admit, force_block, json_mode).await
        }
        SpeakerCommands::Reinstate { speaker_id, reason } => {
            handle_reinstate(speaker_id, &reason, json_mode).await
        }
    }
}

async fn handle_show(speaker_id: Uuid, json_mode: bool) -> Result<()> {
    let (engine, _config) = super::open_engine().await?;
    let profile = engine
        .get_profile(speaker_id)
        .await
        .context("Failed to retrieve speaker profile")?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Speaker Profile:");
        println!("  ID: {}", profile.speaker_id);
        println!("  Bucket: {}", profile.current_bucket);
        println!(
            "  In bucket since: {}",
            profile.bucket_entered_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  Total reports: {}", profile.total_reports);
        println!("  Total errors: {}", profile.total_errors);
        println!("  Total corrections: {}", profile.total_corrections);
        println!("  Bucket changes: {}", profile.change_count);
        if let Some(last_change) = profile.last_change_at {
            println!("  Last change: {}", last_change.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        if profile.progression_halted {
            println!("  Progression: {}", style("HALTED (pending manual audit)").red().bold());
        }
    }

    Ok(())
}

async fn handle_history(speaker_id: Uuid, page: usize, json_mode: bool) -> Result<()> {
    let (engine, _config) = super::open_engine().await?;

    // Surface a clear error for unknown speakers before paging history
    engine.get_profile(speaker_id).await.context("Failed to retrieve speaker profile")?;

    let records = engine
        .get_bucket_history(speaker_id, page)
        .await
        .context("Failed to retrieve bucket history")?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        if page == 0 {
            println!("No bucket changes recorded for {speaker_id}.");
        } else {
            println!("No bucket changes on page {page}.");
        }
    } else {
        println!("Bucket history for {speaker_id} (page {page}):");
        println!("{}", TableFormatter::new().format_history(&records));
    }

    Ok(())
}

async fn handle_evaluate(
    speaker_id: Uuid,
    force_admit: Option<String>,
    force_block: Option<String>,
    json_mode: bool,
) -> Result<()> {
    let override_mode = match (force_admit, force_block) {
        (Some(reason), _) => OverrideMode::ForceAdmit { reason },
        (_, Some(reason)) => OverrideMode::ForceBlock { reason },
        _ => OverrideMode::None,
    };

    let (engine, _config) = super::open_engine().await?;
    let decision = engine
        .evaluate_speaker(speaker_id, &override_mode)
        .await
        .context("Evaluation failed")?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        match &decision {
            Decision::Promote { to, confidence } => {
                println!("{} to {to} (confidence {confidence:.2})", style("Promoted").green());
            }
            Decision::Demote { to, confidence } => {
                println!("{} to {to} (confidence {confidence:.2})", style("Demoted").yellow());
            }
            Decision::NoChange { reason } => {
                println!("No change: {}", reason.as_display());
            }
        }
    }

    Ok(())
}

async fn handle_reinstate(speaker_id: Uuid, reason: &str, json_mode: bool) -> Result<()> {
    let (engine, _config) = super::open_engine().await?;

    // Confirm the speaker exists so a typo'd ID doesn't silently no-op
    engine.get_profile(speaker_id).await.context("Failed to retrieve speaker profile")?;

    engine
        .reinstate_speaker(speaker_id, reason)
        .await
        .context("Failed to reinstate speaker")?;

    if json_mode {
        let payload = serde_json::json!({
            "success": true,
            "speaker_id": speaker_id,
            "reason": reason,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Speaker {speaker_id} reinstated.");
    }

    Ok(())
}
