//! Mutation operations for SeaOrmSessionStore
//!
//! This module contains all write database operations.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::OnConflict};
use tracing::{debug, info};

use super::converters::record_to_active_model;
use super::{SeaOrmSessionStore, retry};
use crate::errors::{Result, SessionManagerError};
use crate::storage::SessionRecord;

use migration::entities::session;

impl SeaOrmSessionStore {
    /// 使用 ON CONFLICT 的原子 upsert，不覆盖 payload
    pub(super) async fn upsert_metadata(&self, record: &SessionRecord) -> Result<()> {
        let db = &self.db;

        retry::retry_transient(
            self.retry_policy,
            &format!("touch({})", record.id),
            || async {
                session::Entity::insert(record_to_active_model(record))
                    .on_conflict(
                        OnConflict::column(session::Column::Id)
                            .update_columns([
                                session::Column::UserId,
                                session::Column::IpAddress,
                                session::Column::UserAgent,
                                session::Column::LastActivity,
                            ])
                            .to_owned(),
                    )
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            SessionManagerError::database_operation(format!(
                "写入会话元数据 '{}' 失败: {}",
                record.id, e
            ))
        })?;

        debug!("Session metadata upserted: {}", record.id);
        Ok(())
    }

    pub(super) async fn delete_by_id(&self, id: &str, user_id: Option<&str>) -> Result<u64> {
        let db = &self.db;

        let result = retry::retry_transient(self.retry_policy, &format!("remove({})", id), || async {
            let mut query =
                session::Entity::delete_many().filter(session::Column::Id.eq(id));
            if let Some(user_id) = user_id {
                query = query.filter(session::Column::UserId.eq(user_id));
            }
            query.exec(db).await
        })
        .await
        .map_err(|e| SessionManagerError::database_operation(format!("删除会话失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Session deleted: {}", id);
        }
        Ok(result.rows_affected)
    }

    pub(super) async fn delete_by_user(&self, user_id: &str, except: Option<&str>) -> Result<u64> {
        let db = &self.db;

        let result = retry::retry_transient(self.retry_policy, "delete_by_user", || async {
            let mut query =
                session::Entity::delete_many().filter(session::Column::UserId.eq(user_id));
            if let Some(except) = except {
                query = query.filter(session::Column::Id.ne(except));
            }
            query.exec(db).await
        })
        .await
        .map_err(|e| SessionManagerError::database_operation(format!("批量删除会话失败: {}", e)))?;

        info!(
            "Deleted {} session(s) for user {}",
            result.rows_affected, user_id
        );
        Ok(result.rows_affected)
    }

    pub(super) async fn delete_expired_rows(&self, cutoff: i64) -> Result<u64> {
        let db = &self.db;

        let result = retry::retry_transient(self.retry_policy, "delete_expired", || async {
            session::Entity::delete_many()
                .filter(session::Column::LastActivity.lt(cutoff))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| {
            SessionManagerError::database_operation(format!("清理过期会话失败: {}", e))
        })?;

        Ok(result.rows_affected)
    }
}
