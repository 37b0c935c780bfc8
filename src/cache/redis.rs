use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use crate::cache::{CacheResult, LocationCache};
use crate::errors::Result;
use crate::geo::SessionLocation;

/// Redis 缓存，值以 JSON 形式存储（`null` 表示查不到的地址）
pub struct RedisLocationCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RedisLocationCache {
    /// 创建客户端，连接在首次使用时建立
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        debug!("RedisLocationCache created for {}", url);

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }
}

#[async_trait]
impl LocationCache for RedisLocationCache {
    async fn get(&self, key: &str) -> CacheResult {
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return CacheResult::Miss;
            }
        };

        let result: redis::RedisResult<Option<String>> = conn.get(key).await;

        match result {
            Ok(Some(data)) => match serde_json::from_str::<Option<SessionLocation>>(&data) {
                Ok(location) => {
                    trace!("Location cache hit: {}", key);
                    CacheResult::Hit(location)
                }
                Err(e) => {
                    error!("Failed to deserialize location for key '{}': {}", key, e);
                    CacheResult::Miss
                }
            },
            Ok(None) => {
                trace!("Location cache miss: {}", key);
                CacheResult::Miss
            }
            Err(e) => {
                error!("Failed to get key '{}': {}", key, e);
                // 连接可能已断开，重置连接
                self.reset_connection().await;
                CacheResult::Miss
            }
        }
    }

    async fn insert(&self, key: &str, value: Option<SessionLocation>, ttl: Duration) {
        let serialized = match serde_json::to_string(&value) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to serialize location for key '{}': {}", key, e);
                return;
            }
        };

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return;
            }
        };

        // SETEX 不接受 0 秒
        let seconds = ttl.as_secs().max(1);
        match conn.set_ex::<&str, String, ()>(key, serialized, seconds).await {
            Ok(_) => trace!("Successfully inserted key into cache: {}", key),
            Err(e) => {
                error!("Failed to insert key '{}' into cache: {}", key, e);
                self.reset_connection().await;
            }
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(RedisLocationCache::new("not-a-redis-url").is_err());
    }

    #[test]
    fn test_valid_url_does_not_connect_eagerly() {
        assert!(RedisLocationCache::new("redis://127.0.0.1:1/").is_ok());
    }
}
