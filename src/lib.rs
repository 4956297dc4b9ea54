//! Tierwise - Speaker quality bucket progression engine
//!
//! Tierwise classifies transcription speakers into ordered quality buckets
//! and moves them between buckets based on windowed error-report metrics,
//! weighted confidence scoring, and non-statistical safeguards, with an
//! append-only audit trail of every change.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Application Layer** (`application`): The engine facade
//! - **Service Layer** (`services`): The five decision components
//! - **Adapters** (`adapters`): SQLite implementations of the repository ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use tierwise::application::{ProgressionEngine, ReportSubmission};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire an engine over a SQLite pool and submit reports
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{ProgressionEngine, ReportSubmission};
pub use domain::errors::{EngineError, EngineResult};
pub use domain::models::{
    BatchResult, Bucket, BucketChangeRecord, Decision, EngineConfig, ErrorReport, NoChangeReason,
    RectificationStatus, SpeakerMetrics, SpeakerProfile, TransitionDirection,
};
pub use domain::ports::{
    HistoryRepository, ProfileFilter, ProfileRepository, ReportRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    BatchScheduler, MetricsAggregator, OverrideMode, ProgressionEvaluator, SafeguardGate,
    ScoreCalculator,
};
