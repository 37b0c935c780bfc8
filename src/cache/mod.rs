//! 位置解析结果缓存
//!
//! 后端通过 `location.cache.store` 选择：`memory`（moka，默认）、`redis`、`null`。

use std::sync::Arc;

use tracing::info;

use crate::config::{LocationCacheConfig, RedisConfig};
use crate::errors::{Result, SessionManagerError};

pub mod memory;
pub mod null;
pub mod redis;
pub mod traits;

pub use memory::MokaLocationCache;
pub use null::NullLocationCache;
pub use redis::RedisLocationCache;
pub use traits::{CacheResult, LocationCache};

pub struct LocationCacheFactory;

impl LocationCacheFactory {
    /// 根据配置创建缓存后端；缓存关闭时返回 [`NullLocationCache`]
    pub fn create(
        config: &LocationCacheConfig,
        redis: &RedisConfig,
    ) -> Result<Arc<dyn LocationCache>> {
        if !config.enabled {
            return Ok(Arc::new(NullLocationCache));
        }

        let cache: Arc<dyn LocationCache> = match config.store_name() {
            "memory" | "moka" => Arc::new(MokaLocationCache::new(config.max_capacity)),
            "redis" => Arc::new(RedisLocationCache::new(&redis.url)?),
            "null" | "none" => Arc::new(NullLocationCache),
            other => {
                return Err(SessionManagerError::cache_backend_not_found(format!(
                    "Unknown location cache store: {}",
                    other
                )));
            }
        };

        info!("Location cache initialized with {} backend", cache.name());
        Ok(cache)
    }
}
