//! Population-wide evaluation sweeps.
//!
//! Runs the per-speaker evaluation path across a set of speakers under
//! bounded parallelism. A failure for one speaker is counted and logged,
//! never aborting the batch; transient store failures are retried with
//! exponential backoff. Immediately re-running a completed batch yields no
//! new transitions because the cooldown and tenure safeguards deny them.

use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::config::BatchConfig;
use crate::domain::models::{BatchResult, Decision};
use crate::domain::ports::{ProfileFilter, ProfileRepository};
use crate::services::progression_evaluator::ProgressionEvaluator;
use crate::services::safeguard_gate::OverrideMode;

/// Service sweeping the evaluator across a speaker population.
pub struct BatchScheduler {
    evaluator: Arc<ProgressionEvaluator>,
    profiles: Arc<dyn ProfileRepository>,
    config: BatchConfig,
}

impl BatchScheduler {
    pub fn new(
        evaluator: Arc<ProgressionEvaluator>,
        profiles: Arc<dyn ProfileRepository>,
        config: BatchConfig,
    ) -> Self {
        Self { evaluator, profiles, config }
    }

    /// Evaluate every speaker matching the filter.
    ///
    /// Halted speakers are excluded up front; their transitions require
    /// manual reinstatement, not another sweep.
    #[instrument(skip(self, filter))]
    pub async fn evaluate_matching(&self, mut filter: ProfileFilter) -> EngineResult<BatchResult> {
        filter.exclude_halted = true;
        let profiles = self.profiles.list(filter).await?;
        let speaker_ids = profiles.into_iter().map(|p| p.speaker_id).collect();
        self.evaluate_all(speaker_ids).await
    }

    /// Evaluate the given speakers under bounded parallelism and summarize
    /// the outcomes.
    pub async fn evaluate_all(&self, speaker_ids: Vec<Uuid>) -> EngineResult<BatchResult> {
        let total = speaker_ids.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel));
        let mut join_set: JoinSet<(Uuid, EngineResult<Decision>)> = JoinSet::new();

        for speaker_id in speaker_ids {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| EngineError::DataStoreUnavailable(e.to_string()))?;
            let evaluator = self.evaluator.clone();
            let retry = self.config.retry.clone();

            join_set.spawn(async move {
                let _permit = permit;
                let outcome = evaluate_with_retry(&evaluator, speaker_id, &retry).await;
                (speaker_id, outcome)
            });
        }

        let mut result = BatchResult::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(decision))) => result.record(&decision),
                Ok((speaker_id, Err(err))) => {
                    error!(speaker_id = %speaker_id, error = %err, "evaluation failed");
                    result.record_failure();
                }
                Err(join_err) => {
                    error!(error = %join_err, "evaluation task panicked");
                    result.record_failure();
                }
            }
        }

        info!(
            total,
            evaluated = result.evaluated,
            promoted = result.promoted,
            demoted = result.demoted,
            skipped = result.skipped,
            failed = result.failed,
            "batch sweep complete"
        );
        Ok(result)
    }
}

/// Run one evaluation, retrying transient store failures with exponential
/// backoff. Decision outcomes and permanent errors pass through untouched.
async fn evaluate_with_retry(
    evaluator: &ProgressionEvaluator,
    speaker_id: Uuid,
    retry: &crate::domain::models::RetryConfig,
) -> EngineResult<Decision> {
    let budget = retry.initial_backoff_ms * 2_u64.saturating_pow(retry.max_retries);
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(retry.initial_backoff_ms))
        .with_max_interval(Duration::from_millis(retry.max_backoff_ms))
        .with_max_elapsed_time(Some(Duration::from_millis(budget)))
        .build();

    backoff::future::retry(policy, || async {
        match evaluator.evaluate(speaker_id, &OverrideMode::None).await {
            Ok(decision) => Ok(decision),
            Err(err) if err.is_transient() => Err(backoff::Error::transient(err)),
            Err(err) => Err(backoff::Error::permanent(err)),
        }
    })
    .await
}
