use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::config::LoggingConfig;

/// Logger initialization handle
///
/// Holds the non-blocking appender guard; dropping it flushes and stops
/// the background writer, so the handle must live for the program's
/// lifetime when file output is enabled.
pub struct LoggerHandle {
    _guard: Option<WorkerGuard>,
}

impl LoggerHandle {
    /// Initialize the global tracing subscriber from the logging config.
    ///
    /// Stderr always gets a layer in the configured format, keeping stdout
    /// free for command output; when `log_dir` is set, a rolling JSON file
    /// layer is added alongside it.
    ///
    /// # Errors
    /// Returns an error if the level, format, or rotation strings are
    /// unrecognized.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = match config.rotation.to_lowercase().as_str() {
                "daily" => rolling::daily(log_dir, "tierwise.log"),
                "hourly" => rolling::hourly(log_dir, "tierwise.log"),
                "never" => rolling::never(log_dir, "tierwise.log"),
                other => anyhow::bail!("Invalid log rotation policy: {other}"),
            };

            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // File layer - always JSON for structured logging
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_current_span(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter.clone());

            match config.format.to_lowercase().as_str() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(file_layer)
                        .with(json_console_layer(env_filter))
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(file_layer)
                        .with(pretty_console_layer(env_filter))
                        .init();
                }
                other => anyhow::bail!("Invalid log format: {other}"),
            }

            Some(guard)
        } else {
            match config.format.to_lowercase().as_str() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(json_console_layer(env_filter))
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(pretty_console_layer(env_filter))
                        .init();
                }
                other => anyhow::bail!("Invalid log format: {other}"),
            }

            None
        };

        tracing::debug!(
            level = %config.level,
            format = %config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

fn json_console_layer<S>(env_filter: EnvFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_writer(io::stderr)
        .with_current_span(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter)
}

fn pretty_console_layer<S>(env_filter: EnvFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter)
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("INFO"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_init_console_only() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
            log_dir: None,
            rotation: "never".to_string(),
        };

        // Initializes the global subscriber; later inits in this process
        // would fail, so only one init test runs here.
        let handle = LoggerHandle::init(&config);
        assert!(handle.is_ok());
    }
}
