//! Derived per-speaker metrics.
//!
//! A `SpeakerMetrics` snapshot is recomputed fresh from the report window on
//! every evaluation and never persisted standalone, so it cannot drift from
//! the facts it was derived from. The snapshot that justified an approved
//! transition is embedded in the audit record.

use serde::{Deserialize, Serialize};

/// Aggregated view of a speaker's recent error-report window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMetrics {
    /// Reports in the evaluation window
    pub report_count: usize,
    /// Reports whose correction outcome is known (rectified or not)
    pub resolved_count: usize,
    /// Arithmetic mean of per-report error rates
    pub mean_error_rate: f64,
    /// Fraction of resolved corrections confirmed rectified.
    /// 0.0 when no reports are resolved; check `resolved_count` before
    /// treating this as evidence.
    pub correction_accuracy: f64,
    /// Inverse of error-rate variance, normalized to [0, 1]
    pub consistency: f64,
    /// Relative change in mean error rate between window halves;
    /// positive means the rate is falling (improving)
    pub improvement_trend: f64,
}

impl SpeakerMetrics {
    /// Whether any resolved corrections back the accuracy figure.
    pub fn has_accuracy_evidence(&self) -> bool {
        self.resolved_count > 0
    }
}
