//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters implement:
//! - `ReportRepository`: error-report persistence
//! - `ProfileRepository`: speaker-profile persistence and the atomic
//!   transition write
//! - `HistoryRepository`: append-only bucket-change audit trail
//!
//! These contracts keep the decision logic independent of the storage
//! technology.

pub mod history_repository;
pub mod profile_repository;
pub mod report_repository;

pub use history_repository::HistoryRepository;
pub use profile_repository::{ProfileFilter, ProfileRepository};
pub use report_repository::ReportRepository;
