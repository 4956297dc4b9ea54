//! Implementation of the `tierwise report` commands.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::application::ReportSubmission;
use crate::cli::types::ReportCommands;
use crate::domain::models::RectificationStatus;

pub async fn execute(command: ReportCommands, json_mode: bool) -> Result<()> {
    match command {
        ReportCommands::Submit { speaker_id, errors, length, rectification } => {
            handle_submit(speaker_id, errors, length, &rectification, json_mode).await
        }
    }
}

async fn handle_submit(
    speaker_id: Uuid,
    errors: u32,
    length: u32,
    rectification: &str,
    json_mode: bool,
) -> Result<()> {
    if length == 0 {
        anyhow::bail!("Reference length must be at least 1 word");
    }

    let rectification = RectificationStatus::from_str(rectification).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid rectification status: {rectification}. \
             Must be one of: rectified, not_rectified, pending"
        )
    })?;

    let (engine, _config) = super::open_engine().await?;
    let report_id = engine
        .submit_report(ReportSubmission {
            speaker_id,
            errors_found: errors,
            reference_length: length,
            rectification,
        })
        .await
        .context("Failed to submit report")?;

    if json_mode {
        let payload = serde_json::json!({
            "report_id": report_id,
            "speaker_id": speaker_id,
            "errors_found": errors,
            "reference_length": length,
            "rectification": rectification,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Report submitted.");
        println!("  Report ID: {report_id}");
        println!("  Speaker: {speaker_id}");
        println!("  Errors: {errors} across {length} words");
    }

    Ok(())
}
