//! 会话列表、统计与注销

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::LocationCacheFactory;
use crate::config::AppConfig;
use crate::device::{DeviceParser, SessionDevice, WootheeDeviceParser};
use crate::errors::{Result, SessionManagerError};
use crate::geo::{CachedIpLocationResolver, IpLocationResolver, SessionLocation};
use crate::i18n::{CatalogLocalizer, Localizer};
use crate::storage::{SessionRecord, SessionStore, StorageFactory};

/// 列表视图中的一个会话，每次列表调用时重新构造
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSession {
    pub id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// unix 秒
    pub last_activity: i64,
    pub is_current: bool,
    pub device: SessionDevice,
    pub location: Option<SessionLocation>,
}

impl UserSession {
    pub fn last_active_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_activity, 0)
    }
}

/// 会话富化服务
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    devices: Arc<dyn DeviceParser>,
    resolver: Option<Arc<dyn IpLocationResolver>>,
    localizer: Arc<dyn Localizer>,
    session_lifetime: Duration,
}

impl SessionManager {
    /// 不带位置富化的会话服务
    pub fn new(store: Arc<dyn SessionStore>, session_lifetime: Duration) -> Self {
        Self {
            store,
            devices: Arc::new(WootheeDeviceParser::new()),
            resolver: None,
            localizer: Arc::new(CatalogLocalizer::default()),
            session_lifetime,
        }
    }

    /// 启用位置富化
    pub fn with_location_resolver(mut self, resolver: Arc<dyn IpLocationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_device_parser(mut self, devices: Arc<dyn DeviceParser>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// 根据完整配置装配：数据库存储、本地化，以及（启用时）MaxMind 解析器
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = StorageFactory::create(&config.database).await?;

        let localizer = CatalogLocalizer::from_config(&config.localization)
            .map_err(|e| SessionManagerError::configuration(e.to_string()))?;

        let mut manager = Self::new(store, config.session.lifetime())
            .with_localizer(Arc::new(localizer));

        if config.location.enabled {
            let cache = LocationCacheFactory::create(&config.location.cache, &config.redis)?;
            let resolver = CachedIpLocationResolver::from_config(&config.location, cache);
            manager = manager.with_location_resolver(Arc::new(resolver));
        } else {
            debug!("Location enrichment disabled");
        }

        Ok(manager)
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    pub fn session_lifetime(&self) -> Duration {
        self.session_lifetime
    }

    pub fn location_enabled(&self) -> bool {
        self.resolver.is_some()
    }

    /// 活跃会话的最早 `last_activity`
    pub fn activity_cutoff(&self) -> i64 {
        cutoff_before(self.session_lifetime)
    }

    /// 用户的活跃会话，按最后活动时间降序
    pub async fn list_sessions(
        &self,
        user_id: &str,
        current_session_id: Option<&str>,
    ) -> Result<Vec<UserSession>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .store
            .active_sessions(user_id, self.activity_cutoff())
            .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(self.enrich(row, current_session_id).await);
        }
        // 不依赖存储实现的排序
        sessions.sort_by_key(|s| Reverse(s.last_activity));
        Ok(sessions)
    }

    /// 单行富化：设备解析 + 位置解析
    pub async fn enrich(&self, row: SessionRecord, current_session_id: Option<&str>) -> UserSession {
        let device = self.devices.parse(row.user_agent.as_deref().unwrap_or(""));

        let location = match (&self.resolver, row.ip_address.as_deref()) {
            (Some(resolver), Some(ip)) if !ip.is_empty() => resolver.resolve(ip).await,
            _ => None,
        };

        UserSession {
            is_current: current_session_id == Some(row.id.as_str()),
            id: row.id,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            last_activity: row.last_activity,
            device,
            location,
        }
    }

    pub async fn session_count(&self, user_id: &str) -> Result<u64> {
        if user_id.is_empty() {
            return Ok(0);
        }
        self.store
            .count_active(user_id, self.activity_cutoff())
            .await
    }

    /// 注销用户的会话；`include_current` 为 false 时保留当前会话
    pub async fn logout_sessions(
        &self,
        user_id: &str,
        current_session_id: Option<&str>,
        include_current: bool,
    ) -> Result<u64> {
        if user_id.is_empty() {
            return Ok(0);
        }

        let except = if include_current {
            None
        } else {
            current_session_id.filter(|id| !id.is_empty())
        };

        let deleted = self.store.delete_user_sessions(user_id, except).await?;
        info!("Logged out {} session(s) for user {}", deleted, user_id);
        Ok(deleted)
    }

    /// 注销单个会话；给定 `user_id` 时只删除该用户的会话
    pub async fn logout_session(&self, session_id: &str, user_id: Option<&str>) -> Result<bool> {
        let deleted = self.store.delete_session(session_id, user_id).await?;
        Ok(deleted > 0)
    }

    pub async fn logout_all_sessions(&self, user_id: &str) -> Result<u64> {
        self.logout_sessions(user_id, None, true).await
    }

    pub async fn logout_other_sessions(
        &self,
        user_id: &str,
        current_session_id: Option<&str>,
    ) -> Result<u64> {
        self.logout_sessions(user_id, current_session_id, false)
            .await
    }
}

/// `now - ttl` 的 unix 秒；负数 TTL 视为 0，溢出时取最早可表示时间
pub(crate) fn cutoff_before(ttl: Duration) -> i64 {
    let ttl = ttl.max(Duration::zero());
    Utc::now()
        .checked_sub_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .timestamp()
}
