//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tierwise")]
#[command(about = "Tierwise - Speaker quality bucket progression engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize Tierwise configuration and database
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },

    /// Error report intake commands
    #[command(subcommand)]
    Report(ReportCommands),

    /// Speaker profile and history commands
    #[command(subcommand)]
    Speaker(SpeakerCommands),

    /// Batch evaluation commands
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Show speaker counts per quality bucket
    Distribution,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Submit an error report for a speaker
    Submit {
        /// Speaker ID
        speaker_id: Uuid,

        /// Number of errors flagged in the transcript
        #[arg(short, long)]
        errors: u32,

        /// Reference length of the transcript, in words
        #[arg(short, long)]
        length: u32,

        /// Rectification status (rectified, not_rectified, pending)
        #[arg(short, long, default_value = "pending")]
        rectification: String,
    },
}

#[derive(Subcommand)]
pub enum SpeakerCommands {
    /// Show a speaker's profile
    Show {
        /// Speaker ID
        speaker_id: Uuid,
    },

    /// Show a speaker's bucket change history, newest first
    History {
        /// Speaker ID
        speaker_id: Uuid,

        /// Zero-based page number
        #[arg(short, long, default_value = "0")]
        page: usize,
    },

    /// Run one evaluation for a speaker
    Evaluate {
        /// Speaker ID
        speaker_id: Uuid,

        /// Bypass timing and quota safeguards, with an audit reason
        #[arg(long, value_name = "REASON")]
        force_admit: Option<String>,

        /// Block any transition this evaluation, with an audit reason
        #[arg(long, value_name = "REASON", conflicts_with = "force_admit")]
        force_block: Option<String>,
    },

    /// Clear the halted flag after a manual audit
    Reinstate {
        /// Speaker ID
        speaker_id: Uuid,

        /// Audit reason for reinstating
        #[arg(short, long)]
        reason: String,
    },
}

#[derive(Subcommand)]
pub enum BatchCommands {
    /// Evaluate every eligible speaker
    Run {
        /// Only evaluate speakers currently in this bucket
        #[arg(short, long)]
        bucket: Option<String>,

        /// Maximum number of speakers to evaluate
        #[arg(short, long)]
        limit: Option<i64>,
    },
}
