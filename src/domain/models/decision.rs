//! Evaluation decisions and batch outcomes.

use serde::{Deserialize, Serialize};

use super::bucket::Bucket;

/// Why an evaluation produced no transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum NoChangeReason {
    /// Fewer reports in the window than the configured minimum
    InsufficientData,
    /// Neither confidence score cleared the decision threshold
    BelowThreshold,
    /// A safeguard denied the candidate transition
    Safeguard(String),
}

impl NoChangeReason {
    pub fn as_display(&self) -> String {
        match self {
            Self::InsufficientData => "insufficient data".to_string(),
            Self::BelowThreshold => "below threshold".to_string(),
            Self::Safeguard(reason) => reason.clone(),
        }
    }
}

/// Outcome of one per-speaker evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum Decision {
    Promote { to: Bucket, confidence: f64 },
    Demote { to: Bucket, confidence: f64 },
    NoChange { reason: NoChangeReason },
}

impl Decision {
    pub fn is_transition(&self) -> bool {
        !matches!(self, Self::NoChange { .. })
    }
}

/// Aggregated outcome of a batch sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Speakers for which an evaluation completed (any decision)
    pub evaluated: usize,
    pub promoted: usize,
    pub demoted: usize,
    /// Evaluations that completed with `NoChange`
    pub skipped: usize,
    /// Evaluations that failed (data store errors, timeouts) after retries
    pub failed: usize,
}

impl BatchResult {
    pub fn record(&mut self, decision: &Decision) {
        self.evaluated += 1;
        match decision {
            Decision::Promote { .. } => self.promoted += 1,
            Decision::Demote { .. } => self.demoted += 1,
            Decision::NoChange { .. } => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}
