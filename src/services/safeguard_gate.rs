//! Non-statistical transition safeguards.
//!
//! Cooldown, change quota, minimum tenure, and evidence minimums. These
//! gates exist so the engine cannot thrash a speaker between buckets no
//! matter what the scores say.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::config::SafeguardConfig;
use crate::domain::models::{SpeakerProfile, TransitionDirection};

/// Administrative bypass for a single evaluation.
///
/// Overrides are a single path through the gate rather than branches in the
/// evaluator, and every override carries an operator-supplied reason that is
/// recorded verbatim in the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverrideMode {
    #[default]
    None,
    /// Admit regardless of the timing/quota rules
    ForceAdmit { reason: String },
    /// Block regardless of the timing/quota rules
    ForceBlock { reason: String },
}

/// Evidence about the speaker gathered by the evaluator for the gate.
#[derive(Debug, Clone, Copy)]
pub struct GateEvidence {
    /// Reports in the evaluation window
    pub window_report_count: usize,
    /// Bucket changes within the trailing change window
    pub recent_change_count: u32,
}

/// A denied transition, with the reason surfaced to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeguardDenial {
    pub reason: String,
}

impl SafeguardDenial {
    fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl std::fmt::Display for SafeguardDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Service validating that a candidate transition is allowed given the
/// speaker's timing and quota history.
#[derive(Debug, Clone)]
pub struct SafeguardGate {
    config: SafeguardConfig,
}

impl Default for SafeguardGate {
    fn default() -> Self {
        Self::new(SafeguardConfig::default())
    }
}

impl SafeguardGate {
    pub fn new(config: SafeguardConfig) -> Self {
        Self { config }
    }

    /// Validate a candidate transition.
    ///
    /// Rules, in order: halted flag, administrative override, cooldown
    /// since the last change, trailing change quota, minimum tenure in the
    /// current bucket, direction-specific evidence minimum. A `ForceAdmit`
    /// override bypasses everything except the halted flag, which requires
    /// manual reinstatement first.
    pub fn admit(
        &self,
        profile: &SpeakerProfile,
        direction: TransitionDirection,
        evidence: GateEvidence,
        now: DateTime<Utc>,
        override_mode: &OverrideMode,
    ) -> Result<(), SafeguardDenial> {
        if profile.progression_halted {
            return Err(SafeguardDenial::new("progression halted pending manual audit"));
        }

        match override_mode {
            OverrideMode::ForceAdmit { reason } => {
                tracing::warn!(
                    speaker_id = %profile.speaker_id,
                    direction = direction.as_str(),
                    reason,
                    "safeguards bypassed by administrative override"
                );
                return Ok(());
            }
            OverrideMode::ForceBlock { reason } => {
                return Err(SafeguardDenial::new(format!("blocked by operator: {reason}")));
            }
            OverrideMode::None => {}
        }

        if let Some(last_change) = profile.last_change_at {
            if now - last_change < Duration::days(self.config.cooldown_days) {
                return Err(SafeguardDenial::new("cooldown period active"));
            }
        }

        if evidence.recent_change_count >= self.config.recent_change_cap {
            return Err(SafeguardDenial::new("recent change quota reached"));
        }

        if now - profile.bucket_entered_at < Duration::days(self.config.min_days_in_bucket) {
            return Err(SafeguardDenial::new("minimum time in bucket"));
        }

        let required = match direction {
            TransitionDirection::Promotion => self.config.promotion_min_reports,
            TransitionDirection::Demotion => self.config.demotion_min_reports,
        };
        if evidence.window_report_count < required {
            return Err(SafeguardDenial::new(format!(
                "insufficient evidence for {}: {} reports in window, need {}",
                direction.as_str(),
                evidence.window_report_count,
                required
            )));
        }

        Ok(())
    }
}
