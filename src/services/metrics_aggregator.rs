//! Window reduction of error reports into a metrics snapshot.

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::config::WindowConfig;
use crate::domain::models::{ErrorReport, RectificationStatus, SpeakerMetrics};

/// Service that reduces a speaker's report window to a `SpeakerMetrics`
/// snapshot.
///
/// Pure over its input slice; the evaluator is responsible for loading the
/// window (most recent reports, ascending by timestamp).
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    min_reports: usize,
    epsilon: f64,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(WindowConfig::default().min_reports, 1e-6)
    }
}

impl MetricsAggregator {
    pub fn new(min_reports: usize, epsilon: f64) -> Self {
        Self { min_reports, epsilon }
    }

    /// Reduce a window of reports to a metrics snapshot.
    ///
    /// `reports` must be ordered ascending by timestamp so the trend split
    /// puts older reports in the first half.
    ///
    /// # Errors
    /// `NotEnoughData` when the window holds fewer than the configured
    /// minimum. Callers treat this as "no decision possible", not a failure.
    pub fn aggregate(&self, reports: &[ErrorReport]) -> EngineResult<SpeakerMetrics> {
        if reports.len() < self.min_reports {
            return Err(EngineError::NotEnoughData {
                have: reports.len(),
                need: self.min_reports,
            });
        }

        let rates: Vec<f64> = reports.iter().map(ErrorReport::error_rate).collect();
        let mean_error_rate = mean(&rates);

        let resolved: Vec<&ErrorReport> =
            reports.iter().filter(|r| r.rectification.is_resolved()).collect();
        let rectified = resolved
            .iter()
            .filter(|r| r.rectification == RectificationStatus::Rectified)
            .count();
        let correction_accuracy = if resolved.is_empty() {
            0.0
        } else {
            rectified as f64 / resolved.len() as f64
        };

        let consistency = consistency_score(&rates, mean_error_rate);

        let midpoint = rates.len() / 2;
        let first_half_mean = mean(&rates[..midpoint]);
        let second_half_mean = mean(&rates[midpoint..]);
        let improvement_trend =
            (first_half_mean - second_half_mean) / first_half_mean.max(self.epsilon);

        Ok(SpeakerMetrics {
            report_count: reports.len(),
            resolved_count: resolved.len(),
            mean_error_rate,
            correction_accuracy,
            consistency,
            improvement_trend,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `1 − min(1, stddev/mean)` clamped to [0, 1]; 1.0 when the mean rate is 0
/// (perfect and uniform).
fn consistency_score(rates: &[f64], mean_rate: f64) -> f64 {
    if mean_rate <= 0.0 {
        return 1.0;
    }
    let variance =
        rates.iter().map(|r| (r - mean_rate).powi(2)).sum::<f64>() / rates.len() as f64;
    let stddev = variance.sqrt();
    (1.0 - (stddev / mean_rate).min(1.0)).clamp(0.0, 1.0)
}
