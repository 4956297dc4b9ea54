//! Error report domain model.
//!
//! An error report is an immutable fact recorded by the intake collaborator
//! whenever a reviewer flags errors in a speaker's transcribed draft.
//! Reports are append-only and retained indefinitely for audit and
//! windowed aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bucket::Bucket;

/// Whether the correction supplied with a report was later confirmed
/// correct in a subsequent draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectificationStatus {
    /// Confirmed correct in a later draft
    Rectified,
    /// Confirmed incorrect in a later draft
    NotRectified,
    /// No later draft has confirmed or refuted it yet
    Pending,
}

impl RectificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectified => "rectified",
            Self::NotRectified => "not_rectified",
            Self::Pending => "pending",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rectified" => Some(Self::Rectified),
            "not_rectified" => Some(Self::NotRectified),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Whether this report can contribute to the correction-accuracy
    /// denominator (pending reports cannot).
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One reviewer-filed error report against a speaker's draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub id: Uuid,
    pub speaker_id: Uuid,
    /// When the errors were reported
    pub occurred_at: DateTime<Utc>,
    /// Number of erroneous spans flagged in the draft
    pub errors_found: u32,
    /// Length of the reference text, in words
    pub reference_length: u32,
    pub rectification: RectificationStatus,
    /// Bucket the speaker occupied when the report was filed
    pub bucket_at_report: Bucket,
}

impl ErrorReport {
    pub fn new(
        speaker_id: Uuid,
        errors_found: u32,
        reference_length: u32,
        rectification: RectificationStatus,
        bucket_at_report: Bucket,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker_id,
            occurred_at: Utc::now(),
            errors_found,
            reference_length,
            rectification,
            bucket_at_report,
        }
    }

    /// Error rate for this report: `errors_found / max(1, reference_length)`.
    pub fn error_rate(&self) -> f64 {
        f64::from(self.errors_found) / f64::from(self.reference_length.max(1))
    }
}
