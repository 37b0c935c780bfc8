use anyhow::Context;
use clap::Parser;
use tracing::debug;

use session_manager::cli::Cli;
use session_manager::config::{AppConfig, DEFAULT_CONFIG_PATH};
use session_manager::interfaces::cli::run_cli_command;
use session_manager::system::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => AppConfig::load(),
    };

    let _guard = init_logging(&config.logging);
    debug!(
        "Configuration loaded from {}",
        cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    );

    if let Err(e) = run_cli_command(&config, cli.command).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    Ok(())
}
