use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::EngineResult;
use crate::domain::models::ErrorReport;

/// Repository port for error-report persistence.
///
/// Reports are append-only facts; no update or delete operations exist.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new report
    async fn insert(&self, report: &ErrorReport) -> EngineResult<()>;

    /// Get a report by ID
    async fn get(&self, id: Uuid) -> EngineResult<Option<ErrorReport>>;

    /// The most recent `limit` reports for a speaker, returned ascending
    /// by timestamp (oldest of the window first)
    async fn recent_window(&self, speaker_id: Uuid, limit: usize)
        -> EngineResult<Vec<ErrorReport>>;

    /// Count all reports ever filed for a speaker
    async fn count_for_speaker(&self, speaker_id: Uuid) -> EngineResult<i64>;
}
