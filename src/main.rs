//! Tierwise CLI entry point.

use clap::Parser;

use tierwise::cli::{Cli, Commands};
use tierwise::domain::models::config::LoggingConfig;
use tierwise::infrastructure::config::ConfigLoader;
use tierwise::infrastructure::logging::LoggerHandle;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging comes up before dispatch; an unreadable config file must not
    // prevent diagnostics, so fall back to the default logging settings.
    let logging = ConfigLoader::load().map(|config| config.logging).unwrap_or_else(|_| {
        let mut fallback = LoggingConfig::default();
        if cli.json {
            fallback.format = "json".to_string();
        }
        fallback
    });
    let _log_guard = match LoggerHandle::init(&logging) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init { force } => tierwise::cli::commands::init::execute(force, cli.json).await,
        Commands::Report(command) => {
            tierwise::cli::commands::report::execute(command, cli.json).await
        }
        Commands::Speaker(command) => {
            tierwise::cli::commands::speaker::execute(command, cli.json).await
        }
        Commands::Batch(command) => tierwise::cli::commands::batch::execute(command, cli.json).await,
        Commands::Distribution => tierwise::cli::commands::distribution::execute(cli.json).await,
    };

    if let Err(err) = result {
        tierwise::cli::handle_error(err, cli.json);
    }
}
