//! Application layer: the engine facade consumed by intake and
//! presentation collaborators.

pub mod engine;

pub use engine::{ProgressionEngine, ReportSubmission};
