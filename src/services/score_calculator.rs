//! Promotion/demotion confidence scoring.
//!
//! Scores are pure functions of a metrics snapshot and the speaker's
//! current bucket. Boundary buckets return `None`: `NoTouch` cannot be
//! promoted further, `HighTouch` cannot be demoted further.

use crate::domain::models::config::{ScoringConfig, ThresholdsConfig};
use crate::domain::models::{Bucket, SpeakerMetrics};

/// Service computing transition confidence scores in [0, 1].
///
/// Promotion is scored against the *target* bucket's thresholds (can the
/// speaker already live up to the next tier), demotion against the
/// *current* bucket's (is the speaker failing the tier they are in).
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    scoring: ScoringConfig,
    thresholds: ThresholdsConfig,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ScoringConfig::default(), ThresholdsConfig::default())
    }
}

impl ScoreCalculator {
    pub fn new(scoring: ScoringConfig, thresholds: ThresholdsConfig) -> Self {
        Self { scoring, thresholds }
    }

    /// Confidence that the speaker is ready for the next-better bucket.
    ///
    /// `None` when the speaker is already at `NoTouch`.
    pub fn score_promotion(&self, metrics: &SpeakerMetrics, current: Bucket) -> Option<f64> {
        let target = current.next_better()?;
        let limits = self.thresholds.for_bucket(target);

        let error_rate_score =
            (1.0 - metrics.mean_error_rate / limits.error_rate_ceiling).clamp(0.0, 1.0);

        // Without any resolved corrections the accuracy dimension is
        // neutral: no credit, no penalty.
        let accuracy_score = if metrics.has_accuracy_evidence() {
            (metrics.correction_accuracy / limits.accuracy_floor).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let consistency_score = metrics.consistency.clamp(0.0, 1.0);
        let trend_score = metrics.improvement_trend.clamp(0.0, 1.0);

        let score = self.scoring.error_rate_weight * error_rate_score
            + self.scoring.accuracy_weight * accuracy_score
            + self.scoring.consistency_weight * consistency_score
            + self.scoring.trend_weight * trend_score;

        Some(score.clamp(0.0, 1.0))
    }

    /// Confidence that the speaker no longer meets their current bucket.
    ///
    /// `None` when the speaker is already at `HighTouch`. A single severe
    /// breach (error rate at 150% of the ceiling, accuracy 20% under the
    /// floor, or consistency under the floor) overrides the weighted sum to
    /// 1.0 so quality regressions are caught without full statistical
    /// confirmation.
    pub fn score_demotion(&self, metrics: &SpeakerMetrics, current: Bucket) -> Option<f64> {
        current.next_worse()?;
        let limits = self.thresholds.for_bucket(current);

        let rate_breached =
            metrics.mean_error_rate >= self.scoring.rate_breach_factor * limits.error_rate_ceiling;
        let accuracy_breached = metrics.has_accuracy_evidence()
            && metrics.correction_accuracy
                <= (1.0 - self.scoring.accuracy_breach_factor) * limits.accuracy_floor;
        let consistency_breached = metrics.consistency < self.scoring.consistency_floor;

        if rate_breached || accuracy_breached || consistency_breached {
            return Some(1.0);
        }

        // No severe breach: weighted proximity to each breach line.
        let rate_overage = ((metrics.mean_error_rate / limits.error_rate_ceiling - 1.0)
            / (self.scoring.rate_breach_factor - 1.0))
            .clamp(0.0, 1.0);

        let accuracy_shortfall = if metrics.has_accuracy_evidence() {
            ((1.0 - metrics.correction_accuracy / limits.accuracy_floor)
                / self.scoring.accuracy_breach_factor)
                .clamp(0.0, 1.0)
        } else {
            0.0
        };

        let inconsistency = ((1.0 - metrics.consistency) / (1.0 - self.scoring.consistency_floor))
            .clamp(0.0, 1.0);

        let regression = (-metrics.improvement_trend).clamp(0.0, 1.0);

        let score = self.scoring.error_rate_weight * rate_overage
            + self.scoring.accuracy_weight * accuracy_shortfall
            + self.scoring.consistency_weight * inconsistency
            + self.scoring.trend_weight * regression;

        Some(score.clamp(0.0, 1.0))
    }

    /// The confidence a score must reach before a transition is considered.
    pub fn decision_threshold(&self) -> f64 {
        self.scoring.decision_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(
        mean_error_rate: f64,
        correction_accuracy: f64,
        consistency: f64,
        improvement_trend: f64,
    ) -> SpeakerMetrics {
        SpeakerMetrics {
            report_count: 10,
            resolved_count: 8,
            mean_error_rate,
            correction_accuracy,
            consistency,
            improvement_trend,
        }
    }

    #[test]
    fn test_promotion_not_applicable_at_no_touch() {
        let calc = ScoreCalculator::default();
        let m = metrics(0.0, 1.0, 1.0, 0.5);
        assert!(calc.score_promotion(&m, Bucket::NoTouch).is_none());
    }

    #[test]
    fn test_demotion_not_applicable_at_high_touch() {
        let calc = ScoreCalculator::default();
        let m = metrics(0.9, 0.1, 0.1, -0.5);
        assert!(calc.score_demotion(&m, Bucket::HighTouch).is_none());
    }

    #[test]
    fn test_strong_candidate_clears_promotion_threshold() {
        // The reference scenario: mean rate 0.02 against the LowTouch
        // ceiling of 0.05, accuracy 0.95, consistency 0.9, trend +0.2.
        let calc = ScoreCalculator::default();
        let m = metrics(0.02, 0.95, 0.9, 0.2);

        let score = calc.score_promotion(&m, Bucket::MediumTouch).unwrap();
        assert!(score >= 0.7, "expected >= 0.7, got {score}");
    }

    #[test]
    fn test_weak_candidate_stays_below_threshold() {
        // Error rate right at the target ceiling, mediocre everything else.
        let calc = ScoreCalculator::default();
        let m = metrics(0.05, 0.80, 0.5, 0.0);

        let score = calc.score_promotion(&m, Bucket::MediumTouch).unwrap();
        assert!(score < 0.7, "expected < 0.7, got {score}");
    }

    #[test]
    fn test_promotion_score_clamped_to_unit_interval() {
        let calc = ScoreCalculator::default();
        let perfect = metrics(0.0, 1.0, 1.0, 5.0);
        let terrible = metrics(10.0, 0.0, 0.0, -5.0);

        let high = calc.score_promotion(&perfect, Bucket::HighTouch).unwrap();
        let low = calc.score_promotion(&terrible, Bucket::HighTouch).unwrap();
        assert!((0.0..=1.0).contains(&high));
        assert!((0.0..=1.0).contains(&low));
    }

    #[test]
    fn test_rate_breach_overrides_weighted_sum() {
        // 150% of the MediumTouch ceiling (0.12) with otherwise healthy
        // metrics that alone would not justify demotion.
        let calc = ScoreCalculator::default();
        let m = metrics(0.18, 0.95, 0.95, 0.1);

        let score = calc.score_demotion(&m, Bucket::MediumTouch).unwrap();
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_accuracy_breach_overrides_weighted_sum() {
        // 20% below the MediumTouch floor of 0.75
        let calc = ScoreCalculator::default();
        let m = metrics(0.05, 0.60, 0.95, 0.1);

        let score = calc.score_demotion(&m, Bucket::MediumTouch).unwrap();
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_consistency_breach_overrides_weighted_sum() {
        let calc = ScoreCalculator::default();
        let m = metrics(0.05, 0.95, 0.6, 0.1);

        let score = calc.score_demotion(&m, Bucket::MediumTouch).unwrap();
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_accuracy_evidence_is_neutral() {
        let calc = ScoreCalculator::default();
        let mut pending_only = metrics(0.05, 0.0, 0.9, 0.0);
        pending_only.resolved_count = 0;

        // Accuracy of 0.0 without evidence must not trigger the breach
        let demotion = calc.score_demotion(&pending_only, Bucket::MediumTouch).unwrap();
        assert!(demotion < 1.0);

        // Promotion gets the neutral midpoint, not full credit
        let with_evidence = metrics(0.05, 1.0, 0.9, 0.0);
        let neutral = calc.score_promotion(&pending_only, Bucket::MediumTouch).unwrap();
        let credited = calc.score_promotion(&with_evidence, Bucket::MediumTouch).unwrap();
        assert!(neutral < credited);
    }

    #[test]
    fn test_healthy_speaker_scores_near_zero_demotion() {
        let calc = ScoreCalculator::default();
        let m = metrics(0.03, 0.95, 0.9, 0.2);

        let score = calc.score_demotion(&m, Bucket::MediumTouch).unwrap();
        assert!(score < 0.2, "expected near zero, got {score}");
    }

    #[test]
    fn test_demotion_rises_as_rate_approaches_breach() {
        let calc = ScoreCalculator::default();
        let near = metrics(0.16, 0.80, 0.85, -0.1);
        let far = metrics(0.13, 0.80, 0.85, -0.1);

        let near_score = calc.score_demotion(&near, Bucket::MediumTouch).unwrap();
        let far_score = calc.score_demotion(&far, Bucket::MediumTouch).unwrap();
        assert!(near_score > far_score);
    }
}
