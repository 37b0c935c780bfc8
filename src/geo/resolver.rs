//! 带缓存的 IP → 位置解析器

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info, trace, warn};

use super::database::GeoDatabase;
use super::maxmind::MaxMindDatabase;
use super::{Coordinates, LocationConfidence, SessionLocation};
use crate::cache::{CacheResult, LocationCache};
use crate::config::LocationConfig;

/// IP 位置解析 trait
///
/// 从不返回错误：数据库不可用、地址非法或查不到都是 `None`。
#[async_trait]
pub trait IpLocationResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> Option<SessionLocation>;
}

/// 解析器参数
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub cache_enabled: bool,
    /// 缓存 key 前缀，为空时 key 只有哈希
    pub key_prefix: String,
    pub ttl: Duration,
    pub store_coordinates: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        let config = LocationConfig::default();
        Self::from(&config)
    }
}

impl From<&LocationConfig> for ResolverSettings {
    fn from(config: &LocationConfig) -> Self {
        Self {
            cache_enabled: config.cache.enabled,
            key_prefix: config.cache.key.clone(),
            ttl: config.cache.ttl(),
            store_coordinates: config.maxmind.store_coordinates,
        }
    }
}

/// 地理数据库 + 缓存 + 精度分类
pub struct CachedIpLocationResolver {
    database: Option<Arc<dyn GeoDatabase>>,
    cache: Arc<dyn LocationCache>,
    settings: ResolverSettings,
}

impl CachedIpLocationResolver {
    pub fn new(
        database: Option<Arc<dyn GeoDatabase>>,
        cache: Arc<dyn LocationCache>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            database,
            cache,
            settings,
        }
    }

    /// 根据配置打开 MaxMind 数据库
    ///
    /// 路径未配置、文件不存在或无法读取时解析器仍可构造，只是总返回 `None`。
    pub fn from_config(config: &LocationConfig, cache: Arc<dyn LocationCache>) -> Self {
        let database: Option<Arc<dyn GeoDatabase>> = match config.maxmind.database_path.as_deref()
        {
            Some(path) if Path::new(path).is_file() => match MaxMindDatabase::open(path) {
                Ok(db) => {
                    info!(
                        "GeoIP: Using MaxMind database at {} ({})",
                        path,
                        db.database_type()
                    );
                    Some(Arc::new(db))
                }
                Err(e) => {
                    warn!("GeoIP: Failed to load MaxMind database at {}: {}", path, e);
                    None
                }
            },
            Some(path) => {
                warn!("GeoIP: MaxMind database not found at {}", path);
                None
            }
            None => {
                debug!("GeoIP: No MaxMind database configured");
                None
            }
        };

        Self::new(database, cache, ResolverSettings::from(config))
    }

    /// 地理数据库是否可用
    pub fn is_available(&self) -> bool {
        self.database.is_some()
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// 缓存 key：`prefix:hex(sha256(ip))`，不在缓存中保存明文 IP
    pub fn cache_key(&self, ip: &str) -> String {
        let hash = format!("{:x}", Sha256::digest(ip.as_bytes()));
        if self.settings.key_prefix.is_empty() {
            hash
        } else {
            format!("{}:{}", self.settings.key_prefix, hash)
        }
    }

    /// 不经缓存直接查询
    pub fn lookup(&self, ip: &str) -> Option<SessionLocation> {
        let database = self.database.as_ref()?;

        let addr: IpAddr = match ip.trim().parse() {
            Ok(addr) => addr,
            Err(_) => {
                debug!("GeoIP: Ignoring malformed IP address {:?}", ip);
                return None;
            }
        };

        let record = match database.city(addr) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                debug!("GeoIP: {} lookup failed for {}: {}", database.name(), ip, e);
                return None;
            }
        };

        let confidence = LocationConfidence::classify(
            record.city.as_deref(),
            record.region.as_deref(),
            record.country_code.as_deref(),
        );

        let coordinates = match (self.settings.store_coordinates, record.latitude, record.longitude)
        {
            (true, Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Some(SessionLocation {
            country_code: record.country_code,
            region: record.region,
            city: record.city,
            timezone: record.timezone,
            coordinates,
            confidence,
            ..Default::default()
        })
    }
}

#[async_trait]
impl IpLocationResolver for CachedIpLocationResolver {
    async fn resolve(&self, ip: &str) -> Option<SessionLocation> {
        if !self.is_available() {
            return None;
        }

        if !self.settings.cache_enabled {
            return self.lookup(ip);
        }

        let key = self.cache_key(ip);
        if let CacheResult::Hit(location) = self.cache.get(&key).await {
            trace!("GeoIP: cache hit for {}", key);
            return location;
        }

        let location = self.lookup(ip);
        self.cache
            .insert(&key, location.clone(), self.settings.ttl)
            .await;
        location
    }
}
