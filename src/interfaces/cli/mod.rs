//! CLI interface module
//!
//! This module provides command-line interface functionality for session-manager.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands, SessionCommands};
use crate::config::AppConfig;
use crate::services::SessionManager;
use commands::{
    config_generate, count_sessions, list_sessions, logout_session, logout_sessions, lookup_ip,
    prune_sessions,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::SessionManagerError> for CliError {
    fn from(err: crate::errors::SessionManagerError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(config: &AppConfig, cmd: Commands) -> Result<(), CliError> {
    match cmd {
        // No DB connection needed
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,

        Commands::Lookup { ip, locale, json } => {
            lookup_ip(config, &ip, locale.as_deref(), json).await
        }

        Commands::Prune { ttl, dry_run } => {
            let manager = SessionManager::from_config(config).await?;
            prune_sessions(&manager, ttl, dry_run).await
        }

        Commands::Sessions { action } => {
            let manager = SessionManager::from_config(config).await?;
            match action {
                SessionCommands::List {
                    user_id,
                    current,
                    locale,
                    json,
                } => {
                    list_sessions(&manager, &user_id, current.as_deref(), locale.as_deref(), json)
                        .await
                }
                SessionCommands::Count { user_id } => count_sessions(&manager, &user_id).await,
                SessionCommands::Logout {
                    user_id,
                    current,
                    all,
                } => logout_sessions(&manager, &user_id, current.as_deref(), all).await,
                SessionCommands::LogoutSession { session_id, user } => {
                    logout_session(&manager, &session_id, user.as_deref()).await
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SessionManagerError;

    #[test]
    fn test_from_session_manager_error() {
        let err: CliError = SessionManagerError::database_connection("refused").into();
        assert!(matches!(err, CliError::StorageError(_)));
        assert!(err.format_simple().contains("refused"));
    }
}
