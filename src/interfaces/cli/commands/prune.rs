//! Prune command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::SessionManager;

pub async fn prune_sessions(
    manager: &SessionManager,
    ttl: Option<u64>,
    dry_run: bool,
) -> Result<(), CliError> {
    let report = manager.prune_expired(ttl, dry_run).await?;
    println!("{}", report.to_string().green());
    Ok(())
}
