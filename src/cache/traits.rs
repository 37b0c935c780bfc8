use std::time::Duration;

use async_trait::async_trait;

use crate::geo::SessionLocation;

/// 缓存查询结果
///
/// 缓存的 `None`（数据库中查不到的地址）同样是命中。
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult {
    /// 命中，值可能是 `None`
    Hit(Option<SessionLocation>),
    /// 未命中
    Miss,
}

/// 位置解析结果缓存
///
/// 后端自行处理并发；同一个 key 被并发计算多次是允许的。
#[async_trait]
pub trait LocationCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult;
    async fn insert(&self, key: &str, value: Option<SessionLocation>, ttl: Duration);

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;
}
