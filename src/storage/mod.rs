use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmSessionStore;
pub use memory::MemorySessionStore;
pub use models::SessionRecord;

/// 会话行存储
///
/// 时间参数均为 unix 秒。活跃会话使用 `last_activity >= cutoff`，
/// 过期会话使用 `last_activity < cutoff`，两者互补。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 用户的活跃会话，按 `last_activity` 降序
    async fn active_sessions(&self, user_id: &str, cutoff: i64) -> Result<Vec<SessionRecord>>;

    async fn count_active(&self, user_id: &str, cutoff: i64) -> Result<u64>;

    async fn get(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// 按 id upsert；冲突时只更新 user_id、ip_address、user_agent、last_activity
    async fn touch(&self, record: &SessionRecord) -> Result<()>;

    /// 删除单个会话，`user_id` 给定时必须属于该用户。返回删除行数
    async fn delete_session(&self, id: &str, user_id: Option<&str>) -> Result<u64>;

    /// 删除用户的全部会话，可排除一个会话 id。返回删除行数
    async fn delete_user_sessions(&self, user_id: &str, except: Option<&str>) -> Result<u64>;

    async fn count_expired(&self, cutoff: i64) -> Result<u64>;

    async fn delete_expired(&self, cutoff: i64) -> Result<u64>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmSessionStore>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        let storage = SeaOrmSessionStore::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
