//! SQLite implementation of the `ProfileRepository`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{parse_bucket, parse_timestamp, parse_uuid};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{Bucket, BucketChangeRecord, SpeakerProfile};
use crate::domain::ports::{ProfileFilter, ProfileRepository};

#[derive(Clone)]
pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn insert(&self, profile: &SpeakerProfile) -> EngineResult<()> {
        sqlx::query(
            r#"INSERT INTO speaker_profiles
               (speaker_id, current_bucket, bucket_entered_at, total_reports,
                total_errors, total_corrections, last_change_at, change_count,
                progression_halted, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(profile.speaker_id.to_string())
        .bind(profile.current_bucket.as_str())
        .bind(profile.bucket_entered_at.to_rfc3339())
        .bind(i64::try_from(profile.total_reports).unwrap_or(i64::MAX))
        .bind(i64::try_from(profile.total_errors).unwrap_or(i64::MAX))
        .bind(i64::try_from(profile.total_corrections).unwrap_or(i64::MAX))
        .bind(profile.last_change_at.map(|t| t.to_rfc3339()))
        .bind(i64::from(profile.change_count))
        .bind(i32::from(profile.progression_halted))
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, speaker_id: Uuid) -> EngineResult<Option<SpeakerProfile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM speaker_profiles WHERE speaker_id = ?")
                .bind(speaker_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, profile: &SpeakerProfile) -> EngineResult<()> {
        let result = sqlx::query(
            r#"UPDATE speaker_profiles SET current_bucket = ?, bucket_entered_at = ?,
               total_reports = ?, total_errors = ?, total_corrections = ?,
               last_change_at = ?, change_count = ?, progression_halted = ?,
               updated_at = ?
               WHERE speaker_id = ?"#,
        )
        .bind(profile.current_bucket.as_str())
        .bind(profile.bucket_entered_at.to_rfc3339())
        .bind(i64::try_from(profile.total_reports).unwrap_or(i64::MAX))
        .bind(i64::try_from(profile.total_errors).unwrap_or(i64::MAX))
        .bind(i64::try_from(profile.total_corrections).unwrap_or(i64::MAX))
        .bind(profile.last_change_at.map(|t| t.to_rfc3339()))
        .bind(i64::from(profile.change_count))
        .bind(i32::from(profile.progression_halted))
        .bind(profile.updated_at.to_rfc3339())
        .bind(profile.speaker_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::SpeakerNotFound(profile.speaker_id));
        }

        Ok(())
    }

    async fn list(&self, filter: ProfileFilter) -> EngineResult<Vec<SpeakerProfile>> {
        let mut query = String::from("SELECT * FROM speaker_profiles WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(bucket) = filter.bucket {
            query.push_str(" AND current_bucket = ?");
            bindings.push(bucket.as_str().to_string());
        }
        if filter.exclude_halted {
            query.push_str(" AND progression_halted = 0");
        }

        query.push_str(" ORDER BY created_at ASC");

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            bindings.push(limit.to_string());
        }

        let mut q = sqlx::query_as::<_, ProfileRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<ProfileRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn apply_transition(
        &self,
        profile: &SpeakerProfile,
        record: &BucketChangeRecord,
    ) -> EngineResult<()> {
        let metrics_json = serde_json::to_string(&record.metrics)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE speaker_profiles SET current_bucket = ?, bucket_entered_at = ?,
               last_change_at = ?, change_count = ?, updated_at = ?
               WHERE speaker_id = ?"#,
        )
        .bind(profile.current_bucket.as_str())
        .bind(profile.bucket_entered_at.to_rfc3339())
        .bind(profile.last_change_at.map(|t| t.to_rfc3339()))
        .bind(i64::from(profile.change_count))
        .bind(profile.updated_at.to_rfc3339())
        .bind(profile.speaker_id.to_string())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(EngineError::SpeakerNotFound(profile.speaker_id));
        }

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
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_halted(&self, speaker_id: Uuid, halted: bool) -> EngineResult<()> {
        let result = sqlx::query(
            "UPDATE speaker_profiles SET progression_halted = ?, updated_at = ?
             WHERE speaker_id = ?",
        )
        .bind(i32::from(halted))
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(speaker_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::SpeakerNotFound(speaker_id));
        }

        Ok(())
    }

    async fn bucket_distribution(&self) -> EngineResult<HashMap<Bucket, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT current_bucket, COUNT(*) FROM speaker_profiles GROUP BY current_bucket",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut distribution: HashMap<Bucket, i64> =
            Bucket::all().into_iter().map(|b| (b, 0)).collect();
        for (bucket, count) in rows {
            distribution.insert(parse_bucket(&bucket, "speaker_profiles.current_bucket")?, count);
        }
        Ok(distribution)
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    speaker_id: String,
    current_bucket: String,
    bucket_entered_at: String,
    total_reports: i64,
    total_errors: i64,
    total_corrections: i64,
    last_change_at: Option<String>,
    change_count: i64,
    progression_halted: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProfileRow> for SpeakerProfile {
    type Error = EngineError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(SpeakerProfile {
            speaker_id: parse_uuid(&row.speaker_id, "speaker_profiles.speaker_id")?,
            current_bucket: parse_bucket(&row.current_bucket, "speaker_profiles.current_bucket")?,
            bucket_entered_at: parse_timestamp(
                &row.bucket_entered_at,
                "speaker_profiles.bucket_entered_at",
            )?,
            total_reports: u64::try_from(row.total_reports.max(0)).unwrap_or(u64::MAX),
            total_errors: u64::try_from(row.total_errors.max(0)).unwrap_or(u64::MAX),
            total_corrections: u64::try_from(row.total_corrections.max(0)).unwrap_or(u64::MAX),
            last_change_at: row
                .last_change_at
                .as_deref()
                .map(|t| parse_timestamp(t, "speaker_profiles.last_change_at"))
                .transpose()?,
            change_count: u32::try_from(row.change_count.max(0)).unwrap_or(u32::MAX),
            progression_halted: row.progression_halted != 0,
            created_at: parse_timestamp(&row.created_at, "speaker_profiles.created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "speaker_profiles.updated_at")?,
        })
    }
}
