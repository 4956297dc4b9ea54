//! Engine configuration model.
//!
//! Every tunable the scoring and safeguard rules depend on is a named,
//! overridable constant here; operators adjust them through the config
//! file or environment without a code change.

use serde::{Deserialize, Serialize};

use super::bucket::Bucket;

/// Main configuration structure for the progression engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Evaluation window sizing
    #[serde(default)]
    pub window: WindowConfig,

    /// Scoring weights and decision thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Per-bucket quality thresholds
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Transition safeguards (cooldown, quota, tenure, evidence minimums)
    #[serde(default)]
    pub safeguards: SafeguardConfig,

    /// Batch sweep parallelism and retry policy
    #[serde(default)]
    pub batch: BatchConfig,

    /// Audit history paging
    #[serde(default)]
    pub history: HistoryConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Evaluation window sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WindowConfig {
    /// Most-recent reports considered per evaluation
    #[serde(default = "default_window_size")]
    pub size: usize,

    /// Below this many reports the speaker is not yet decidable
    #[serde(default = "default_min_reports")]
    pub min_reports: usize,
}

const fn default_window_size() -> usize {
    25
}

const fn default_min_reports() -> usize {
    5
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { size: default_window_size(), min_reports: default_min_reports() }
    }
}

/// Weights for the confidence scores and the shared decision threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Weight of the error-rate margin term
    #[serde(default = "default_error_rate_weight")]
    pub error_rate_weight: f64,

    /// Weight of the correction-accuracy term
    #[serde(default = "default_accuracy_weight")]
    pub accuracy_weight: f64,

    /// Weight of the consistency term
    #[serde(default = "default_consistency_weight")]
    pub consistency_weight: f64,

    /// Weight of the improvement-trend term
    #[serde(default = "default_trend_weight")]
    pub trend_weight: f64,

    /// Confidence a score must reach before a transition is considered
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,

    /// Error rate at or past this multiple of the current ceiling is a
    /// severe breach (hard demotion override)
    #[serde(default = "default_rate_breach_factor")]
    pub rate_breach_factor: f64,

    /// Accuracy this fraction below the current floor is a severe breach
    #[serde(default = "default_accuracy_breach_factor")]
    pub accuracy_breach_factor: f64,

    /// Consistency below this is a severe breach
    #[serde(default = "default_consistency_floor")]
    pub consistency_floor: f64,

    /// Denominator guard for the trend computation
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

const fn default_error_rate_weight() -> f64 {
    0.4
}

const fn default_accuracy_weight() -> f64 {
    0.3
}

const fn default_consistency_weight() -> f64 {
    0.15
}

const fn default_trend_weight() -> f64 {
    0.15
}

const fn default_decision_threshold() -> f64 {
    0.7
}

const fn default_rate_breach_factor() -> f64 {
    1.5
}

const fn default_accuracy_breach_factor() -> f64 {
    0.2
}

const fn default_consistency_floor() -> f64 {
    0.7
}

const fn default_epsilon() -> f64 {
    1e-6
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            error_rate_weight: default_error_rate_weight(),
            accuracy_weight: default_accuracy_weight(),
            consistency_weight: default_consistency_weight(),
            trend_weight: default_trend_weight(),
            decision_threshold: default_decision_threshold(),
            rate_breach_factor: default_rate_breach_factor(),
            accuracy_breach_factor: default_accuracy_breach_factor(),
            consistency_floor: default_consistency_floor(),
            epsilon: default_epsilon(),
        }
    }
}

/// Quality thresholds for one bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BucketThresholds {
    /// Mean error rate must stay under this ceiling
    pub error_rate_ceiling: f64,
    /// Correction accuracy must stay above this floor
    pub accuracy_floor: f64,
}

/// Per-bucket thresholds for all four tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ThresholdsConfig {
    #[serde(default = "default_high_touch_thresholds")]
    pub high_touch: BucketThresholds,
    #[serde(default = "default_medium_touch_thresholds")]
    pub medium_touch: BucketThresholds,
    #[serde(default = "default_low_touch_thresholds")]
    pub low_touch: BucketThresholds,
    #[serde(default = "default_no_touch_thresholds")]
    pub no_touch: BucketThresholds,
}

const fn default_high_touch_thresholds() -> BucketThresholds {
    BucketThresholds { error_rate_ceiling: 0.25, accuracy_floor: 0.60 }
}

const fn default_medium_touch_thresholds() -> BucketThresholds {
    BucketThresholds { error_rate_ceiling: 0.12, accuracy_floor: 0.75 }
}

const fn default_low_touch_thresholds() -> BucketThresholds {
    BucketThresholds { error_rate_ceiling: 0.05, accuracy_floor: 0.85 }
}

const fn default_no_touch_thresholds() -> BucketThresholds {
    BucketThresholds { error_rate_ceiling: 0.02, accuracy_floor: 0.95 }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high_touch: default_high_touch_thresholds(),
            medium_touch: default_medium_touch_thresholds(),
            low_touch: default_low_touch_thresholds(),
            no_touch: default_no_touch_thresholds(),
        }
    }
}

impl ThresholdsConfig {
    pub fn for_bucket(&self, bucket: Bucket) -> BucketThresholds {
        match bucket {
            Bucket::HighTouch => self.high_touch,
            Bucket::MediumTouch => self.medium_touch,
            Bucket::LowTouch => self.low_touch,
            Bucket::NoTouch => self.no_touch,
        }
    }
}

/// Non-statistical gating rules for transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SafeguardConfig {
    /// Days since the last bucket change before another is allowed
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: i64,

    /// Maximum bucket changes within the trailing change window
    #[serde(default = "default_recent_change_cap")]
    pub recent_change_cap: u32,

    /// Trailing window, in days, for the change cap
    #[serde(default = "default_recent_change_window_days")]
    pub recent_change_window_days: i64,

    /// Days a speaker must settle in a bucket before moving again
    #[serde(default = "default_min_days_in_bucket")]
    pub min_days_in_bucket: i64,

    /// Window reports required before a promotion is considered
    #[serde(default = "default_promotion_min_reports")]
    pub promotion_min_reports: usize,

    /// Window reports required before a demotion is considered
    #[serde(default = "default_demotion_min_reports")]
    pub demotion_min_reports: usize,
}

const fn default_cooldown_days() -> i64 {
    14
}

const fn default_recent_change_cap() -> u32 {
    2
}

const fn default_recent_change_window_days() -> i64 {
    30
}

const fn default_min_days_in_bucket() -> i64 {
    7
}

const fn default_promotion_min_reports() -> usize {
    10
}

const fn default_demotion_min_reports() -> usize {
    5
}

impl Default for SafeguardConfig {
    fn default() -> Self {
        Self {
            cooldown_days: default_cooldown_days(),
            recent_change_cap: default_recent_change_cap(),
            recent_change_window_days: default_recent_change_window_days(),
            min_days_in_bucket: default_min_days_in_bucket(),
            promotion_min_reports: default_promotion_min_reports(),
            demotion_min_reports: default_demotion_min_reports(),
        }
    }
}

/// Batch sweep parallelism and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Maximum concurrent per-speaker evaluations
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Bound on each data-store call during an evaluation, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Retry policy for transient store failures
    #[serde(default)]
    pub retry: RetryConfig,
}

const fn default_max_parallel() -> usize {
    8
}

const fn default_store_timeout_ms() -> u64 {
    5_000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            store_timeout_ms: default_store_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff policy for transient store failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    250
}

const fn default_max_backoff_ms() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Audit history paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistoryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

const fn default_page_size() -> usize {
    20
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".tierwise/tierwise.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_connections: default_max_connections() }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for rolling file output
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation policy for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let scoring = ScoringConfig::default();
        let sum = scoring.error_rate_weight
            + scoring.accuracy_weight
            + scoring.consistency_weight
            + scoring.trend_weight;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ceilings_tighten_toward_no_touch() {
        let thresholds = ThresholdsConfig::default();
        assert!(
            thresholds.high_touch.error_rate_ceiling > thresholds.medium_touch.error_rate_ceiling
        );
        assert!(
            thresholds.medium_touch.error_rate_ceiling > thresholds.low_touch.error_rate_ceiling
        );
        assert!(thresholds.low_touch.error_rate_ceiling > thresholds.no_touch.error_rate_ceiling);
    }

    #[test]
    fn test_for_bucket_lookup() {
        let thresholds = ThresholdsConfig::default();
        let low = thresholds.for_bucket(Bucket::LowTouch);
        assert!((low.error_rate_ceiling - 0.05).abs() < f64::EPSILON);
        assert!((low.accuracy_floor - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_promotion_needs_more_evidence_than_demotion() {
        let safeguards = SafeguardConfig::default();
        assert!(safeguards.promotion_min_reports > safeguards.demotion_min_reports);
    }
}
