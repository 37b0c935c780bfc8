use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CacheResult, LocationCache};
use crate::geo::SessionLocation;

/// 不缓存任何内容，每次都回源
pub struct NullLocationCache;

#[async_trait]
impl LocationCache for NullLocationCache {
    async fn get(&self, key: &str) -> CacheResult {
        trace!("NullLocationCache.get called for key: {}", key);
        CacheResult::Miss
    }

    async fn insert(&self, key: &str, _: Option<SessionLocation>, _ttl: Duration) {
        trace!("NullLocationCache.insert called for key: {}", key);
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullLocationCache;
        cache
            .insert("k", Some(SessionLocation::default()), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await, CacheResult::Miss);
    }
}
