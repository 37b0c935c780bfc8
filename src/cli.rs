//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for session-manager using clap's derive macros.

use clap::{Parser, Subcommand};

/// session-manager - track and revoke user login sessions
#[derive(Parser)]
#[command(name = "session-manager")]
#[command(version)]
#[command(about = "Track, enrich and revoke user login sessions", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and revoke a user's sessions
    Sessions {
        #[command(subcommand)]
        action: SessionCommands,
    },

    /// Resolve an IP address and print its location label
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,

        /// Label locale (default: localization.default_locale)
        #[arg(long)]
        locale: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prune expired session records
    Prune {
        /// Session TTL in minutes (default: session.lifetime_minutes)
        #[arg(long)]
        ttl: Option<u64>,

        /// Show how many sessions would be deleted without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Session management commands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// List a user's active sessions
    List {
        user_id: String,

        /// Session id to mark as current
        #[arg(long)]
        current: Option<String>,

        /// Label locale (default: localization.default_locale)
        #[arg(long)]
        locale: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count a user's active sessions
    Count { user_id: String },

    /// Log out a user's sessions
    Logout {
        user_id: String,

        /// Session id to keep
        #[arg(long)]
        current: Option<String>,

        /// Also log out the current session
        #[arg(long)]
        all: bool,
    },

    /// Log out a single session
    LogoutSession {
        session_id: String,

        /// Only delete the session if it belongs to this user
        #[arg(long)]
        user: Option<String>,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
