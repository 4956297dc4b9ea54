//! The progression engine facade.
//!
//! Wires repositories and services together and exposes the external
//! interface: report intake, per-speaker evaluation, batch sweeps, and the
//! read paths the presentation layer consumes.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::sqlite::{
    SqliteHistoryRepository, SqliteProfileRepository, SqliteReportRepository,
};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    BatchResult, Bucket, BucketChangeRecord, Decision, EngineConfig, ErrorReport,
    RectificationStatus, SpeakerProfile,
};
use crate::domain::ports::{
    HistoryRepository, ProfileFilter, ProfileRepository, ReportRepository,
};
use crate::services::{BatchScheduler, OverrideMode, ProgressionEvaluator};

/// Intake payload for a new error report.
///
/// The engine stamps the report with the speaker's current bucket and the
/// submission time; the intake collaborator supplies only the observed
/// facts.
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    pub speaker_id: Uuid,
    pub errors_found: u32,
    pub reference_length: u32,
    pub rectification: RectificationStatus,
}

/// Facade over the five decision components and their repositories.
pub struct ProgressionEngine {
    reports: Arc<dyn ReportRepository>,
    profiles: Arc<dyn ProfileRepository>,
    history: Arc<dyn HistoryRepository>,
    evaluator: Arc<ProgressionEvaluator>,
    scheduler: BatchScheduler,
    page_size: usize,
}

impl ProgressionEngine {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        profiles: Arc<dyn ProfileRepository>,
        history: Arc<dyn HistoryRepository>,
        config: &EngineConfig,
    ) -> Self {
        let evaluator = Arc::new(ProgressionEvaluator::new(
            reports.clone(),
            profiles.clone(),
            history.clone(),
            config,
        ));
        let scheduler =
            BatchScheduler::new(evaluator.clone(), profiles.clone(), config.batch.clone());

        Self {
            reports,
            profiles,
            history,
            evaluator,
            scheduler,
            page_size: config.history.page_size,
        }
    }

    /// Convenience constructor wiring the SQLite repositories.
    pub fn with_sqlite(pool: SqlitePool, config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(SqliteReportRepository::new(pool.clone())),
            Arc::new(SqliteProfileRepository::new(pool.clone())),
            Arc::new(SqliteHistoryRepository::new(pool)),
            config,
        )
    }

    /// Persist an error report and trigger an asynchronous evaluation.
    ///
    /// Unseen speakers get a fresh profile in the default bucket. The
    /// evaluation is fire-and-forget: intake never blocks on the decision,
    /// bucket changes surface later through the audit history.
    pub async fn submit_report(&self, submission: ReportSubmission) -> EngineResult<Uuid> {
        let speaker_id = submission.speaker_id;
        let now = Utc::now();

        let mut profile = match self.profiles.get(speaker_id).await? {
            Some(profile) => profile,
            None => {
                let profile = SpeakerProfile::new(speaker_id);
                self.profiles.insert(&profile).await?;
                info!(speaker_id = %speaker_id, "new speaker profile created");
                profile
            }
        };

        let report = ErrorReport::new(
            speaker_id,
            submission.errors_found,
            submission.reference_length,
            submission.rectification,
            profile.current_bucket,
        );
        let report_id = report.id;
        self.reports.insert(&report).await?;

        profile.record_report(
            submission.errors_found,
            submission.rectification == RectificationStatus::Rectified,
            now,
        );
        self.profiles.update(&profile).await?;

        let evaluator = self.evaluator.clone();
        tokio::spawn(async move {
            match evaluator.evaluate(speaker_id, &OverrideMode::None).await {
                Ok(decision) => {
                    info!(speaker_id = %speaker_id, ?decision, "post-intake evaluation finished");
                }
                Err(err) => {
                    warn!(speaker_id = %speaker_id, error = %err, "post-intake evaluation failed");
                }
            }
        });

        Ok(report_id)
    }

    /// Manually trigger one evaluation for a speaker.
    pub async fn evaluate_speaker(
        &self,
        speaker_id: Uuid,
        override_mode: &OverrideMode,
    ) -> EngineResult<Decision> {
        self.evaluator.evaluate(speaker_id, override_mode).await
    }

    /// Sweep every speaker matching the filter.
    pub async fn evaluate_all(&self, filter: ProfileFilter) -> EngineResult<BatchResult> {
        self.scheduler.evaluate_matching(filter).await
    }

    pub async fn get_profile(&self, speaker_id: Uuid) -> EngineResult<SpeakerProfile> {
        self.profiles
            .get(speaker_id)
            .await?
            .ok_or(EngineError::SpeakerNotFound(speaker_id))
    }

    /// One page of a speaker's bucket-change history, newest first.
    pub async fn get_bucket_history(
        &self,
        speaker_id: Uuid,
        page: usize,
    ) -> EngineResult<Vec<BucketChangeRecord>> {
        self.history
            .page_for_speaker(speaker_id, self.page_size, page * self.page_size)
            .await
    }

    pub async fn bucket_distribution(
        &self,
    ) -> EngineResult<std::collections::HashMap<Bucket, i64>> {
        self.profiles.bucket_distribution().await
    }

    /// Clear the halted flag after a manual audit of the speaker's history.
    pub async fn reinstate_speaker(&self, speaker_id: Uuid, reason: &str) -> EngineResult<()> {
        self.profiles.set_halted(speaker_id, false).await?;
        info!(speaker_id = %speaker_id, reason, "speaker reinstated by operator");
        Ok(())
    }
}
