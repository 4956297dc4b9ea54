//! Speaker profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bucket::Bucket;

/// Current progression state for one speaker.
///
/// Created on the first error report for a previously-unseen speaker and
/// mutated exclusively by the engine when a transition is approved. The
/// cumulative counters exist for display only and never feed the decision
/// logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    pub speaker_id: Uuid,
    pub current_bucket: Bucket,
    /// When the speaker entered the current bucket
    pub bucket_entered_at: DateTime<Utc>,
    /// Display counter: all reports ever filed
    pub total_reports: u64,
    /// Display counter: all errors ever flagged
    pub total_errors: u64,
    /// Display counter: all corrections confirmed rectified
    pub total_corrections: u64,
    /// Most recent bucket change, if any
    pub last_change_at: Option<DateTime<Utc>>,
    /// Lifetime count of bucket changes
    pub change_count: u32,
    /// Set when the audit-replay invariant fails; blocks automatic
    /// transitions until an operator reinstates the speaker
    pub progression_halted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SpeakerProfile {
    /// Fresh profile for a previously-unseen speaker.
    pub fn new(speaker_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            speaker_id,
            current_bucket: Bucket::default(),
            bucket_entered_at: now,
            total_reports: 0,
            total_errors: 0,
            total_corrections: 0,
            last_change_at: None,
            change_count: 0,
            progression_halted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold an intake report into the display counters.
    pub fn record_report(&mut self, errors_found: u32, rectified: bool, now: DateTime<Utc>) {
        self.total_reports += 1;
        self.total_errors += u64::from(errors_found);
        if rectified {
            self.total_corrections += 1;
        }
        self.updated_at = now;
    }

    /// Apply an approved transition to the profile state.
    ///
    /// The caller is responsible for persisting this together with the
    /// audit record in one transaction.
    pub fn apply_transition(&mut self, to: Bucket, now: DateTime<Utc>) {
        self.current_bucket = to;
        self.bucket_entered_at = now;
        self.last_change_at = Some(now);
        self.change_count += 1;
        self.updated_at = now;
    }
}
