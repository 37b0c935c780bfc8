//! 进程内会话存储，用于测试和嵌入场景

use async_trait::async_trait;
use dashmap::DashMap;

use super::{SessionRecord, SessionStore};
use crate::errors::Result;

#[derive(Default)]
pub struct MemorySessionStore {
    rows: DashMap<String, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入整行（包括 payload）
    pub fn insert(&self, record: SessionRecord) {
        self.rows.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn remove_where<F>(&self, predicate: F) -> u64
    where
        F: Fn(&SessionRecord) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|_, row| !predicate(row));
        (before - self.rows.len()) as u64
    }
}

fn owned_by(row: &SessionRecord, user_id: &str) -> bool {
    row.user_id.as_deref() == Some(user_id)
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn active_sessions(&self, user_id: &str, cutoff: i64) -> Result<Vec<SessionRecord>> {
        let mut rows: Vec<SessionRecord> = self
            .rows
            .iter()
            .filter(|row| owned_by(row, user_id) && row.last_activity >= cutoff)
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(rows)
    }

    async fn count_active(&self, user_id: &str, cutoff: i64) -> Result<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|row| owned_by(row, user_id) && row.last_activity >= cutoff)
            .count() as u64)
    }

    async fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.rows.get(id).map(|row| row.value().clone()))
    }

    async fn touch(&self, record: &SessionRecord) -> Result<()> {
        self.rows
            .entry(record.id.clone())
            .and_modify(|row| {
                row.user_id = record.user_id.clone();
                row.ip_address = record.ip_address.clone();
                row.user_agent = record.user_agent.clone();
                row.last_activity = record.last_activity;
            })
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn delete_session(&self, id: &str, user_id: Option<&str>) -> Result<u64> {
        let removed = self
            .rows
            .remove_if(id, |_, row| user_id.is_none_or(|u| owned_by(row, u)));
        Ok(removed.map_or(0, |_| 1))
    }

    async fn delete_user_sessions(&self, user_id: &str, except: Option<&str>) -> Result<u64> {
        Ok(self.remove_where(|row| owned_by(row, user_id) && Some(row.id.as_str()) != except))
    }

    async fn count_expired(&self, cutoff: i64) -> Result<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.last_activity < cutoff)
            .count() as u64)
    }

    async fn delete_expired(&self, cutoff: i64) -> Result<u64> {
        Ok(self.remove_where(|row| row.last_activity < cutoff))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
