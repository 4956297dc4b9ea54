use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::EngineConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid window: min_reports ({min}) cannot exceed size ({size})")]
    InvalidWindow { min: usize, size: usize },

    #[error("Invalid scoring weight {name}: {value}. Must be in [0, 1]")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Invalid decision threshold: {0}. Must be in (0, 1]")]
    InvalidDecisionThreshold(f64),

    #[error("Invalid rate breach factor: {0}. Must be greater than 1")]
    InvalidRateBreachFactor(f64),

    #[error("Invalid {bucket} error rate ceiling: {value}. Must be positive")]
    InvalidCeiling { bucket: &'static str, value: f64 },

    #[error("Invalid {bucket} accuracy floor: {value}. Must be in (0, 1]")]
    InvalidFloor { bucket: &'static str, value: f64 },

    #[error("Invalid max_parallel: {0}. Must be between 1 and 64")]
    InvalidMaxParallel(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tierwise/config.yaml (project config, created by init)
    /// 3. .tierwise/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`TIERWISE_*` prefix, highest priority)
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(".tierwise/config.yaml"))
            .merge(Yaml::file(".tierwise/local.yaml"))
            .merge(Env::prefixed("TIERWISE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    #[allow(clippy::too_many_lines)]
    pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
        if config.window.min_reports > config.window.size {
            return Err(ConfigError::InvalidWindow {
                min: config.window.min_reports,
                size: config.window.size,
            });
        }

        let weights = [
            ("error_rate_weight", config.scoring.error_rate_weight),
            ("accuracy_weight", config.scoring.accuracy_weight),
            ("consistency_weight", config.scoring.consistency_weight),
            ("trend_weight", config.scoring.trend_weight),
        ];
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        if !(config.scoring.decision_threshold > 0.0 && config.scoring.decision_threshold <= 1.0) {
            return Err(ConfigError::InvalidDecisionThreshold(config.scoring.decision_threshold));
        }

        if config.scoring.rate_breach_factor <= 1.0 {
            return Err(ConfigError::InvalidRateBreachFactor(config.scoring.rate_breach_factor));
        }

        let tiers = [
            ("high_touch", config.thresholds.high_touch),
            ("medium_touch", config.thresholds.medium_touch),
            ("low_touch", config.thresholds.low_touch),
            ("no_touch", config.thresholds.no_touch),
        ];
        for (bucket, limits) in tiers {
            if limits.error_rate_ceiling <= 0.0 {
                return Err(ConfigError::InvalidCeiling {
                    bucket,
                    value: limits.error_rate_ceiling,
                });
            }
            if !(limits.accuracy_floor > 0.0 && limits.accuracy_floor <= 1.0) {
                return Err(ConfigError::InvalidFloor { bucket, value: limits.accuracy_floor });
            }
        }

        if config.batch.max_parallel == 0 || config.batch.max_parallel > 64 {
            return Err(ConfigError::InvalidMaxParallel(config.batch.max_parallel));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
