//! Signal toolkit CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, SignalsCommand};
use sigkit_config::load_config;
use sigkit_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(Some(&cli.config))
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.format == "json";
    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    let _guard = setup_logging(&level, json, log_file.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, &config).await,
        Commands::Tune(args) => cli::commands::tune::run(args, &config).await,
        Commands::Signals(SignalsCommand::Generate(args)) => {
            cli::commands::signals::generate(args, &config).await
        }
        Commands::Signals(SignalsCommand::List(args)) => {
            cli::commands::signals::list(args, &config).await
        }
        Commands::Signals(SignalsCommand::Add(args)) => {
            cli::commands::signals::add(args, &config).await
        }
        Commands::Watch(args) => cli::commands::watch::run(args, &config).await,
        Commands::Notify(args) => cli::commands::notify::run(args, &config).await,
        Commands::Fetch(args) => cli::commands::fetch::run(args, &config).await,
        Commands::Compare(args) => cli::commands::compare::run(args, &config).await,
        Commands::ValidateConfig => cli::commands::config::validate(&cli.config, &config).await,
        Commands::ShowConfig(args) => cli::commands::config::show(args, &config).await,
    }
}
