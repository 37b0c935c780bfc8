//! 过期会话清理

use std::fmt;

use chrono::Duration;
use serde::Serialize;
use tracing::info;

use super::SessionManager;
use super::session_manager::cutoff_before;
use crate::config::MAX_LIFETIME_MINUTES;
use crate::errors::Result;

/// 一次清理的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// `last_activity` 早于该时间戳（unix 秒）的会话视为过期
    pub cutoff: i64,
    /// 过期会话数
    pub expired: u64,
    /// 实际删除数（dry run 时为 0）
    pub deleted: u64,
    pub dry_run: bool,
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(f, "[DRY RUN] {} expired sessions would be pruned.", self.expired)
        } else if self.expired == 0 {
            write!(f, "No expired sessions found.")
        } else {
            write!(f, "Pruned {} expired session(s).", self.deleted)
        }
    }
}

impl SessionManager {
    /// 删除 `last_activity < now - ttl` 的会话
    ///
    /// `ttl_minutes` 缺省时使用会话生命周期；`dry_run` 只统计不删除。
    pub async fn prune_expired(&self, ttl_minutes: Option<u64>, dry_run: bool) -> Result<PruneReport> {
        let ttl = match ttl_minutes {
            Some(minutes) => Duration::minutes(minutes.min(MAX_LIFETIME_MINUTES) as i64),
            None => self.session_lifetime(),
        };
        let cutoff = cutoff_before(ttl);

        let expired = self.store().count_expired(cutoff).await?;

        let deleted = if dry_run || expired == 0 {
            0
        } else {
            self.store().delete_expired(cutoff).await?
        };

        if deleted > 0 {
            info!("Pruned {} expired session(s) older than {}", deleted, cutoff);
        }

        Ok(PruneReport {
            cutoff,
            expired,
            deleted,
            dry_run,
        })
    }
}
