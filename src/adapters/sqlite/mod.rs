//! SQLite implementations of the repository ports.

pub mod connection;
pub mod history_repository;
pub mod migrations;
pub mod profile_repository;
pub mod report_repository;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError};
pub use history_repository::SqliteHistoryRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use profile_repository::SqliteProfileRepository;
pub use report_repository::SqliteReportRepository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::Bucket;

pub(crate) fn parse_uuid(value: &str, column: &str) -> EngineResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| EngineError::SerializationError(format!("bad uuid in {column}: {e}")))
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> EngineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EngineError::SerializationError(format!("bad timestamp in {column}: {e}")))
}

pub(crate) fn parse_bucket(value: &str, column: &str) -> EngineResult<Bucket> {
    Bucket::from_str(value)
        .ok_or_else(|| EngineError::SerializationError(format!("bad bucket in {column}: {value}")))
}
