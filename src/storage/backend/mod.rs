//! SeaORM session store
//!
//! 会话行存储在 SQLite、MySQL/MariaDB 或 PostgreSQL 的 `sessions` 表中。

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, SessionManagerError};
use crate::storage::{SessionRecord, SessionStore};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, record_to_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(SessionManagerError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based session store
#[derive(Clone)]
pub struct SeaOrmSessionStore {
    db: DatabaseConnection,
    backend_name: String,
    retry_policy: retry::RetryPolicy,
}

impl SeaOrmSessionStore {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(SessionManagerError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            // mariadb 与 mysql 共用驱动
            let url = config.database_url.replacen("mariadb://", "mysql://", 1);
            connect_generic(&url, backend_name, config.pool_size).await?
        };

        run_migrations(&db).await?;

        let store = Self::from_connection(db, backend_name, retry::RetryPolicy::from(config));
        info!("{} session store initialized.", backend_name.to_uppercase());
        Ok(store)
    }

    /// 使用已有连接（迁移需由调用方负责）
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry_policy: retry::RetryPolicy,
    ) -> Self {
        Self {
            db,
            backend_name: backend_name.to_string(),
            retry_policy,
        }
    }
}

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    async fn active_sessions(&self, user_id: &str, cutoff: i64) -> Result<Vec<SessionRecord>> {
        self.find_active(user_id, cutoff).await
    }

    async fn count_active(&self, user_id: &str, cutoff: i64) -> Result<u64> {
        self.count_active_rows(user_id, cutoff).await
    }

    async fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        self.find_by_id(id).await
    }

    async fn touch(&self, record: &SessionRecord) -> Result<()> {
        self.upsert_metadata(record).await
    }

    async fn delete_session(&self, id: &str, user_id: Option<&str>) -> Result<u64> {
        self.delete_by_id(id, user_id).await
    }

    async fn delete_user_sessions(&self, user_id: &str, except: Option<&str>) -> Result<u64> {
        self.delete_by_user(user_id, except).await
    }

    async fn count_expired(&self, cutoff: i64) -> Result<u64> {
        self.count_expired_rows(cutoff).await
    }

    async fn delete_expired(&self, cutoff: i64) -> Result<u64> {
        self.delete_expired_rows(cutoff).await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
