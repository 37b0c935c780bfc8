//! Query operations for SeaOrmSessionStore
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use super::converters::model_to_record;
use super::{SeaOrmSessionStore, retry};
use crate::errors::{Result, SessionManagerError};
use crate::storage::SessionRecord;

use migration::entities::session;

impl SeaOrmSessionStore {
    pub(super) async fn find_active(&self, user_id: &str, cutoff: i64) -> Result<Vec<SessionRecord>> {
        let db = &self.db;

        let models = retry::retry_transient(self.retry_policy, "find_active", || async {
            session::Entity::find()
                .filter(session::Column::UserId.eq(user_id))
                .filter(session::Column::LastActivity.gte(cutoff))
                .order_by_desc(session::Column::LastActivity)
                .all(db)
                .await
        })
        .await
        .map_err(|e| SessionManagerError::database_operation(format!("查询会话失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_record).collect())
    }

    pub(super) async fn count_active_rows(&self, user_id: &str, cutoff: i64) -> Result<u64> {
        let db = &self.db;

        retry::retry_transient(self.retry_policy, "count_active", || async {
            session::Entity::find()
                .filter(session::Column::UserId.eq(user_id))
                .filter(session::Column::LastActivity.gte(cutoff))
                .count(db)
                .await
        })
        .await
        .map_err(|e| SessionManagerError::database_operation(format!("统计会话失败: {}", e)))
    }

    pub(super) async fn find_by_id(&self, id: &str) -> Result<Option<SessionRecord>> {
        let db = &self.db;

        let model = retry::retry_transient(self.retry_policy, &format!("get({})", id), || async {
            session::Entity::find_by_id(id.to_string()).one(db).await
        })
        .await
        .map_err(|e| SessionManagerError::database_operation(format!("查询会话失败: {}", e)))?;

        Ok(model.map(model_to_record))
    }

    pub(super) async fn count_expired_rows(&self, cutoff: i64) -> Result<u64> {
        let db = &self.db;

        retry::retry_transient(self.retry_policy, "count_expired", || async {
            session::Entity::find()
                .filter(session::Column::LastActivity.lt(cutoff))
                .count(db)
                .await
        })
        .await
        .map_err(|e| {
            SessionManagerError::database_operation(format!("统计过期会话失败: {}", e))
        })
    }
}
