//! Domain models for the progression engine.

pub mod bucket;
pub mod change_record;
pub mod config;
pub mod decision;
pub mod metrics;
pub mod profile;
pub mod report;

pub use bucket::Bucket;
pub use change_record::{replay_bucket, BucketChangeRecord, ReplayError, TransitionDirection};
pub use config::{
    BatchConfig, BucketThresholds, DatabaseConfig, EngineConfig, HistoryConfig, LoggingConfig,
    RetryConfig, SafeguardConfig, ScoringConfig, ThresholdsConfig, WindowConfig,
};
pub use decision::{BatchResult, Decision, NoChangeReason};
pub use metrics::SpeakerMetrics;
pub use profile::SpeakerProfile;
pub use report::{ErrorReport, RectificationStatus};
