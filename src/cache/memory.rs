use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::{debug, trace};

use crate::cache::{CacheResult, LocationCache};
use crate::geo::SessionLocation;

/// 带单条 TTL 的缓存值
#[derive(Debug, Clone)]
struct CachedLocation {
    value: Option<SessionLocation>,
    ttl: Duration,
}

/// 过期策略：使用写入时指定的 TTL
struct PerEntryExpiry;

impl Expiry<String, CachedLocation> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedLocation,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedLocation,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// 进程内 moka 缓存
pub struct MokaLocationCache {
    inner: Cache<String, CachedLocation>,
}

impl MokaLocationCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "MokaLocationCache initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }
}

#[async_trait]
impl LocationCache for MokaLocationCache {
    async fn get(&self, key: &str) -> CacheResult {
        match self.inner.get(key).await {
            Some(entry) => {
                trace!("Location cache hit: {}", key);
                CacheResult::Hit(entry.value)
            }
            None => {
                trace!("Location cache miss: {}", key);
                CacheResult::Miss
            }
        }
    }

    async fn insert(&self, key: &str, value: Option<SessionLocation>, ttl: Duration) {
        self.inner
            .insert(key.to_string(), CachedLocation { value, ttl })
            .await;
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> SessionLocation {
        SessionLocation {
            country_code: Some("FR".into()),
            city: Some("Paris".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = MokaLocationCache::new(100);
        assert_eq!(cache.get("a").await, CacheResult::Miss);

        cache.insert("a", Some(paris()), Duration::from_secs(60)).await;
        assert_eq!(cache.get("a").await, CacheResult::Hit(Some(paris())));
    }

    #[tokio::test]
    async fn test_cached_none_is_a_hit() {
        let cache = MokaLocationCache::new(100);
        cache.insert("missing", None, Duration::from_secs(60)).await;
        assert_eq!(cache.get("missing").await, CacheResult::Hit(None));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaLocationCache::new(100);
        cache.insert("a", Some(paris()), Duration::from_millis(50)).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get("a").await, CacheResult::Miss);
    }

    #[tokio::test]
    async fn test_reinsert_replaces_value_and_ttl() {
        let cache = MokaLocationCache::new(100);
        cache.insert("a", None, Duration::from_millis(50)).await;
        cache.insert("a", Some(paris()), Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get("a").await, CacheResult::Hit(Some(paris())));
    }
}
