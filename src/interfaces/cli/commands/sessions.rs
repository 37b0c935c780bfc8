//! Session management commands

use colored::Colorize;

use crate::geo::LabelOptions;
use crate::interfaces::cli::CliError;
use crate::services::{SessionManager, UserSession};

fn render_session(manager: &SessionManager, session: &UserSession, locale: Option<&str>) -> String {
    let mut parts = vec![session.id.cyan().to_string()];

    if session.is_current {
        parts.push("(current)".green().bold().to_string());
    }

    parts.push(session.device.summary());

    if let Some(ref ip) = session.ip_address {
        parts.push(ip.blue().to_string());
    }

    if let Some(ref location) = session.location {
        let opts = LabelOptions {
            include_country: true,
            locale,
            ..Default::default()
        };
        parts.push(format!(
            "{} {}",
            location.confidence_icon(),
            location.label_with_confidence(manager.localizer(), opts)
        ));
    }

    if let Some(at) = session.last_active_at() {
        parts.push(
            format!("(last active: {})", at.format("%Y-%m-%d %H:%M:%S UTC"))
                .dimmed()
                .to_string(),
        );
    }

    parts.join(" ")
}

pub async fn list_sessions(
    manager: &SessionManager,
    user_id: &str,
    current: Option<&str>,
    locale: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let sessions = manager.list_sessions(user_id, current).await?;

    if json {
        let out = serde_json::to_string_pretty(&sessions)
            .map_err(|e| CliError::CommandError(format!("Failed to serialize sessions: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{} No active sessions for user {}", "ℹ".bold().blue(), user_id);
        return Ok(());
    }

    println!("{}", format!("Active sessions for user {}:", user_id).bold().green());
    println!();
    for session in &sessions {
        println!("  {}", render_session(manager, session, locale));
    }
    println!();
    println!(
        "{} Total {} active session(s)",
        "ℹ".bold().blue(),
        sessions.len().to_string().green()
    );
    Ok(())
}

pub async fn count_sessions(manager: &SessionManager, user_id: &str) -> Result<(), CliError> {
    let count = manager.session_count(user_id).await?;
    println!("{}", count);
    Ok(())
}

pub async fn logout_sessions(
    manager: &SessionManager,
    user_id: &str,
    current: Option<&str>,
    all: bool,
) -> Result<(), CliError> {
    let deleted = manager.logout_sessions(user_id, current, all).await?;
    println!(
        "{} Logged out {} session(s) for user {}",
        "✓".bold().green(),
        deleted.to_string().green(),
        user_id.cyan()
    );
    Ok(())
}

pub async fn logout_session(
    manager: &SessionManager,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<(), CliError> {
    if manager.logout_session(session_id, user_id).await? {
        println!("{} Logged out session {}", "✓".bold().green(), session_id.cyan());
        Ok(())
    } else {
        Err(CliError::CommandError(format!(
            "Session not found: {}",
            session_id
        )))
    }
}
