//! Bucket change audit records.
//!
//! Every approved transition appends exactly one record; records are never
//! updated or deleted. Replaying a speaker's records in timestamp order from
//! the default bucket must reproduce the profile's current bucket — that is
//! the engine's core consistency guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bucket::Bucket;
use super::metrics::SpeakerMetrics;

/// Direction of a bucket transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    Promotion,
    Demotion,
}

impl TransitionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promotion => "promotion",
            Self::Demotion => "demotion",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "promotion" => Some(Self::Promotion),
            "demotion" => Some(Self::Demotion),
            _ => None,
        }
    }
}

/// Append-only audit entry for one approved bucket transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketChangeRecord {
    pub id: Uuid,
    pub speaker_id: Uuid,
    pub from_bucket: Bucket,
    pub to_bucket: Bucket,
    pub direction: TransitionDirection,
    /// The metrics snapshot that justified the decision
    pub metrics: SpeakerMetrics,
    /// Confidence score that cleared the decision threshold
    pub confidence: f64,
    /// Human-readable rationale; override reasons are prefixed distinctly
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl BucketChangeRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        speaker_id: Uuid,
        from_bucket: Bucket,
        to_bucket: Bucket,
        direction: TransitionDirection,
        metrics: SpeakerMetrics,
        confidence: f64,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker_id,
            from_bucket,
            to_bucket,
            direction,
            metrics,
            confidence,
            reason,
            occurred_at,
        }
    }
}

/// Replay a speaker's change history from the default starting bucket.
///
/// `records` must be ordered by `occurred_at` ascending. Returns the bucket
/// the history ends at, or the first record whose `from_bucket` does not
/// chain from the preceding state.
pub fn replay_bucket(records: &[BucketChangeRecord]) -> Result<Bucket, ReplayError> {
    let mut current = Bucket::default();
    for record in records {
        if record.from_bucket != current {
            return Err(ReplayError {
                record_id: record.id,
                expected_from: current,
                found_from: record.from_bucket,
            });
        }
        current = record.to_bucket;
    }
    Ok(current)
}

/// A change record that does not chain from the preceding replay state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayError {
    pub record_id: Uuid,
    pub expected_from: Bucket,
    pub found_from: Bucket,
}
