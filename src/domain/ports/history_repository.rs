use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::EngineResult;
use crate::domain::models::BucketChangeRecord;

/// Repository port for the append-only bucket-change audit trail.
///
/// Records are normally written through
/// `ProfileRepository::apply_transition`; the standalone `append` exists for
/// the intake of externally-sourced history (imports, test fixtures).
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a change record
    async fn append(&self, record: &BucketChangeRecord) -> EngineResult<()>;

    /// One page of a speaker's history, newest first
    async fn page_for_speaker(
        &self,
        speaker_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> EngineResult<Vec<BucketChangeRecord>>;

    /// A speaker's complete history, ascending by timestamp (replay order)
    async fn full_history(&self, speaker_id: Uuid) -> EngineResult<Vec<BucketChangeRecord>>;

    /// Count of a speaker's changes at or after `since`
    async fn count_since(&self, speaker_id: Uuid, since: DateTime<Utc>) -> EngineResult<i64>;
}
