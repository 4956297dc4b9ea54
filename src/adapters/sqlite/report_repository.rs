//! SQLite implementation of the `ReportRepository`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_bucket, parse_timestamp, parse_uuid};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{ErrorReport, RectificationStatus};
use crate::domain::ports::ReportRepository;

#[derive(Clone)]
pub struct SqliteReportRepository {
    pool: SqlitePool,
}

impl SqliteReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for SqliteReportRepository {
    async fn insert(&self, report: &ErrorReport) -> EngineResult<()> {
        sqlx::query(
            r#"INSERT INTO error_reports
               (id, speaker_id, occurred_at, errors_found, reference_length,
                rectification, bucket_at_report)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(report.id.to_string())
        .bind(report.speaker_id.to_string())
        .bind(report.occurred_at.to_rfc3339())
        .bind(i64::from(report.errors_found))
        .bind(i64::from(report.reference_length))
        .bind(report.rectification.as_str())
        .bind(report.bucket_at_report.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> EngineResult<Option<ErrorReport>> {
        let row: Option<ReportRow> = sqlx::query_as("SELECT * FROM error_reports WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn recent_window(
        &self,
        speaker_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<ErrorReport>> {
        let rows: Vec<ReportRow> = sqlx::query_as(
            "SELECT * FROM error_reports WHERE speaker_id = ?
             ORDER BY occurred_at DESC LIMIT ?",
        )
        .bind(speaker_id.to_string())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        // Fetched newest-first; callers get the window oldest-first.
        let mut reports = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<EngineResult<Vec<ErrorReport>>>()?;
        reports.reverse();
        Ok(reports)
    }

    async fn count_for_speaker(&self, speaker_id: Uuid) -> EngineResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM error_reports WHERE speaker_id = ?")
                .bind(speaker_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    speaker_id: String,
    occurred_at: String,
    errors_found: i64,
    reference_length: i64,
    rectification: String,
    bucket_at_report: String,
}

impl TryFrom<ReportRow> for ErrorReport {
    type Error = EngineError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(ErrorReport {
            id: parse_uuid(&row.id, "error_reports.id")?,
            speaker_id: parse_uuid(&row.speaker_id, "error_reports.speaker_id")?,
            occurred_at: parse_timestamp(&row.occurred_at, "error_reports.occurred_at")?,
            errors_found: u32::try_from(row.errors_found.max(0)).unwrap_or(u32::MAX),
            reference_length: u32::try_from(row.reference_length.max(0)).unwrap_or(u32::MAX),
            rectification: RectificationStatus::from_str(&row.rectification).ok_or_else(|| {
                EngineError::SerializationError(format!(
                    "bad rectification status: {}",
                    row.rectification
                ))
            })?,
            bucket_at_report: parse_bucket(&row.bucket_at_report, "error_reports.bucket_at_report")?,
        })
    }
}
