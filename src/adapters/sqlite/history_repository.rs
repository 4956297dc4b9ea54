//! SQLite implementation of the `HistoryRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_bucket, parse_timestamp, parse_uuid};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{BucketChangeRecord, SpeakerMetrics, TransitionDirection};
use crate::domain::ports::HistoryRepository;

#[derive(Clone)]
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, record: &BucketChangeRecord) -> EngineResult<()> {
        let metrics_json = serde_json::to_string(&record.metrics)?;

        sqlx::query(
            r#"INSERT INTO bucket_changes
               (id, speaker_id, from_bucket, to_bucket, direction, metrics,
                confidence, reason, occurred_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.speaker_id.to_string())
        .bind(record.from_bucket.as_str())
        .bind(record.to_bucket.as_str())
        .bind(record.direction.as_str())
        .bind(&metrics_json)
        .bind(record.confidence)
        .bind(&record.reason)
        .bind(record.occurred_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn page_for_speaker(
        &self,
        speaker_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> EngineResult<Vec<BucketChangeRecord>> {
        let rows: Vec<ChangeRow> = sqlx::query_as(
            "SELECT * FROM bucket_changes WHERE speaker_id = ?
             ORDER BY occurred_at DESC LIMIT ? OFFSET ?",
        )
        .bind(speaker_id.to_string())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn full_history(&self, speaker_id: Uuid) -> EngineResult<Vec<BucketChangeRecord>> {
        let rows: Vec<ChangeRow> = sqlx::query_as(
            "SELECT * FROM bucket_changes WHERE speaker_id = ? ORDER BY occurred_at ASC",
        )
        .bind(speaker_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_since(&self, speaker_id: Uuid, since: DateTime<Utc>) -> EngineResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bucket_changes WHERE speaker_id = ? AND occurred_at >= ?",
        )
        .bind(speaker_id.to_string())
        .bind(since.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct ChangeRow {
    id: String,
    speaker_id: String,
    from_bucket: String,
    to_bucket: String,
    direction: String,
    metrics: String,
    confidence: f64,
    reason: String,
    occurred_at: String,
}

impl TryFrom<ChangeRow> for BucketChangeRecord {
    type Error = EngineError;

    fn try_from(row: ChangeRow) -> Result<Self, Self::Error> {
        let metrics: SpeakerMetrics = serde_json::from_str(&row.metrics)?;

        Ok(BucketChangeRecord {
            id: parse_uuid(&row.id, "bucket_changes.id")?,
            speaker_id: parse_uuid(&row.speaker_id, "bucket_changes.speaker_id")?,
            from_bucket: parse_bucket(&row.from_bucket, "bucket_changes.from_bucket")?,
            to_bucket: parse_bucket(&row.to_bucket, "bucket_changes.to_bucket")?,
            direction: TransitionDirection::from_str(&row.direction).ok_or_else(|| {
                EngineError::SerializationError(format!("bad direction: {}", row.direction))
            })?,
            metrics,
            confidence: row.confidence,
            reason: row.reason,
            occurred_at: parse_timestamp(&row.occurred_at, "bucket_changes.occurred_at")?,
        })
    }
}
