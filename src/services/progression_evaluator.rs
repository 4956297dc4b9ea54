//! Per-speaker progression evaluation.
//!
//! Orchestrates the aggregator, calculator, and gate into a single decision
//! per call. Evaluations for the same speaker are serialized through an
//! async lock map; an evaluation either completes atomically or is
//! abandoned before any write.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::config::EngineConfig;
use crate::domain::models::{
    replay_bucket, Bucket, BucketChangeRecord, Decision, NoChangeReason, SpeakerMetrics,
    SpeakerProfile, TransitionDirection,
};
use crate::domain::ports::{HistoryRepository, ProfileRepository, ReportRepository};
use crate::services::metrics_aggregator::MetricsAggregator;
use crate::services::safeguard_gate::{GateEvidence, OverrideMode, SafeguardGate};
use crate::services::score_calculator::ScoreCalculator;

/// Service issuing one progression decision per speaker evaluation.
pub struct ProgressionEvaluator {
    reports: Arc<dyn ReportRepository>,
    profiles: Arc<dyn ProfileRepository>,
    history: Arc<dyn HistoryRepository>,
    aggregator: MetricsAggregator,
    calculator: ScoreCalculator,
    gate: SafeguardGate,
    window_size: usize,
    change_window_days: i64,
    store_timeout: StdDuration,
    // One guard per speaker: at most one in-flight evaluation each
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ProgressionEvaluator {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        profiles: Arc<dyn ProfileRepository>,
        history: Arc<dyn HistoryRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            reports,
            profiles,
            history,
            aggregator: MetricsAggregator::new(config.window.min_reports, config.scoring.epsilon),
            calculator: ScoreCalculator::new(
                config.scoring.clone(),
                config.thresholds.clone(),
            ),
            gate: SafeguardGate::new(config.safeguards.clone()),
            window_size: config.window.size,
            change_window_days: config.safeguards.recent_change_window_days,
            store_timeout: StdDuration::from_millis(config.batch.store_timeout_ms),
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Evaluate one speaker and apply the winning transition, if any.
    ///
    /// Promotion is checked before demotion; ties favor promotion since it
    /// already requires the stronger evidence bar. `NoChange` carries the
    /// reason for transparency: insufficient data, below threshold, or the
    /// specific safeguard denial.
    #[instrument(skip(self, override_mode), fields(speaker_id = %speaker_id))]
    pub async fn evaluate(
        &self,
        speaker_id: Uuid,
        override_mode: &OverrideMode,
    ) -> EngineResult<Decision> {
        let lock = self.speaker_lock(speaker_id).await;
        let _guard = lock.lock().await;

        let profile = self
            .timed(self.profiles.get(speaker_id))
            .await?
            .ok_or(EngineError::SpeakerNotFound(speaker_id))?;

        let window = self.timed(self.reports.recent_window(speaker_id, self.window_size)).await?;

        let metrics = match self.aggregator.aggregate(&window) {
            Ok(metrics) => metrics,
            Err(EngineError::NotEnoughData { have, need }) => {
                info!(have, need, "speaker not yet decidable");
                return Ok(Decision::NoChange { reason: NoChangeReason::InsufficientData });
            }
            Err(err) => return Err(err),
        };

        let now = Utc::now();
        let since = now - Duration::days(self.change_window_days);
        let recent_changes = self.timed(self.history.count_since(speaker_id, since)).await?;
        let evidence = GateEvidence {
            window_report_count: metrics.report_count,
            recent_change_count: u32::try_from(recent_changes.max(0)).unwrap_or(u32::MAX),
        };

        let threshold = self.calculator.decision_threshold();
        let mut last_denial: Option<String> = None;

        if let (Some(target), Some(confidence)) = (
            profile.current_bucket.next_better(),
            self.calculator.score_promotion(&metrics, profile.current_bucket),
        ) {
            if confidence >= threshold {
                match self.gate.admit(
                    &profile,
                    TransitionDirection::Promotion,
                    evidence,
                    now,
                    override_mode,
                ) {
                    Ok(()) => {
                        return self
                            .apply_transition(
                                profile,
                                target,
                                TransitionDirection::Promotion,
                                metrics,
                                confidence,
                                override_mode,
                            )
                            .await;
                    }
                    Err(denial) => {
                        info!(confidence, reason = %denial, "promotion denied by safeguard");
                        last_denial = Some(denial.reason);
                    }
                }
            }
        }

        if let (Some(target), Some(confidence)) = (
            profile.current_bucket.next_worse(),
            self.calculator.score_demotion(&metrics, profile.current_bucket),
        ) {
            if confidence >= threshold {
                match self.gate.admit(
                    &profile,
                    TransitionDirection::Demotion,
                    evidence,
                    now,
                    override_mode,
                ) {
                    Ok(()) => {
                        return self
                            .apply_transition(
                                profile,
                                target,
                                TransitionDirection::Demotion,
                                metrics,
                                confidence,
                                override_mode,
                            )
                            .await;
                    }
                    Err(denial) => {
                        info!(confidence, reason = %denial, "demotion denied by safeguard");
                        last_denial = Some(denial.reason);
                    }
                }
            }
        }

        let reason = match last_denial {
            Some(denial) => NoChangeReason::Safeguard(denial),
            None => NoChangeReason::BelowThreshold,
        };
        Ok(Decision::NoChange { reason })
    }

    /// Verify the replay invariant and commit the transition atomically.
    async fn apply_transition(
        &self,
        mut profile: SpeakerProfile,
        target: Bucket,
        direction: TransitionDirection,
        metrics: SpeakerMetrics,
        confidence: f64,
        override_mode: &OverrideMode,
    ) -> EngineResult<Decision> {
        let speaker_id = profile.speaker_id;

        self.verify_replay(&profile).await?;

        let now = Utc::now();
        let from = profile.current_bucket;
        let reason = transition_reason(direction, from, target, confidence, override_mode);

        profile.apply_transition(target, now);
        let record = BucketChangeRecord::new(
            speaker_id,
            from,
            target,
            direction,
            metrics,
            confidence,
            reason,
            now,
        );

        self.timed(self.profiles.apply_transition(&profile, &record)).await?;

        info!(
            from = from.as_str(),
            to = target.as_str(),
            direction = direction.as_str(),
            confidence,
            "bucket transition applied"
        );

        match direction {
            TransitionDirection::Promotion => Ok(Decision::Promote { to: target, confidence }),
            TransitionDirection::Demotion => Ok(Decision::Demote { to: target, confidence }),
        }
    }

    /// Replay the audit history and compare with the profile.
    ///
    /// On mismatch the speaker is flagged halted so no further automatic
    /// transitions run until an operator reinstates them.
    async fn verify_replay(&self, profile: &SpeakerProfile) -> EngineResult<()> {
        let history = self.timed(self.history.full_history(profile.speaker_id)).await?;

        let replayed = match replay_bucket(&history) {
            Ok(bucket) if bucket == profile.current_bucket => return Ok(()),
            Ok(bucket) => bucket,
            Err(broken) => {
                error!(
                    record_id = %broken.record_id,
                    expected_from = broken.expected_from.as_str(),
                    found_from = broken.found_from.as_str(),
                    "audit history chain is broken"
                );
                broken.found_from
            }
        };

        if let Err(err) = self.profiles.set_halted(profile.speaker_id, true).await {
            warn!(error = %err, "failed to persist halted flag");
        }

        Err(EngineError::InvariantViolation {
            speaker_id: profile.speaker_id,
            replayed,
            current: profile.current_bucket,
        })
    }

    async fn speaker_lock(&self, speaker_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&speaker_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        // Drop guards released their clones; only the map still holds those
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(speaker_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Bound a data-store call; a timeout is an evaluation failure, not a
    /// decision.
    async fn timed<T>(
        &self,
        fut: impl Future<Output = EngineResult<T>>,
    ) -> EngineResult<T> {
        tokio::time::timeout(self.store_timeout, fut).await.map_err(|_| {
            EngineError::DataStoreUnavailable(format!(
                "store call exceeded {}ms",
                self.store_timeout.as_millis()
            ))
        })?
    }
}

fn transition_reason(
    direction: TransitionDirection,
    from: Bucket,
    to: Bucket,
    confidence: f64,
    override_mode: &OverrideMode,
) -> String {
    let base = format!(
        "{} from {} to {} at confidence {confidence:.2}",
        direction.as_str(),
        from.as_str(),
        to.as_str()
    );
    match override_mode {
        OverrideMode::ForceAdmit { reason } => format!("operator override ({reason}): {base}"),
        _ => base,
    }
}
