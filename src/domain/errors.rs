//! Domain errors for the progression engine.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::Bucket;

/// Engine-level errors.
///
/// `NotEnoughData` and `SafeguardDenied` are expected outcomes: the
/// evaluator folds them into a `NoChange` decision rather than surfacing
/// them as failures. `DataStoreUnavailable` is transient and retried by the
/// batch scheduler. `InvariantViolation` is fatal for the affected speaker:
/// it halts further automatic transitions pending manual audit.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not enough data: {have} reports in window, need {need}")]
    NotEnoughData { have: usize, need: usize },

    #[error("Safeguard denied: {0}")]
    SafeguardDenied(String),

    #[error("Data store unavailable: {0}")]
    DataStoreUnavailable(String),

    #[error("Audit replay mismatch for speaker {speaker_id}: history replays to {replayed}, profile holds {current}")]
    InvariantViolation { speaker_id: Uuid, replayed: Bucket, current: Bucket },

    #[error("Speaker not found: {0}")]
    SpeakerNotFound(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether a retry with backoff could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DataStoreUnavailable(_) | Self::DatabaseError(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}
