//! Service layer: the five decision components.

pub mod batch_scheduler;
pub mod metrics_aggregator;
pub mod progression_evaluator;
pub mod safeguard_gate;
pub mod score_calculator;

pub use batch_scheduler::BatchScheduler;
pub use metrics_aggregator::MetricsAggregator;
pub use progression_evaluator::ProgressionEvaluator;
pub use safeguard_gate::{GateEvidence, OverrideMode, SafeguardDenial, SafeguardGate};
pub use score_calculator::ScoreCalculator;
