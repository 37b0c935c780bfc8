use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 会话生命周期与清理 TTL 的上限（100 年）
pub const MAX_LIFETIME_MINUTES: u64 = 60 * 24 * 365 * 100;

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - database: 会话表所在数据库
/// - session: 会话生命周期与元数据写入节流
/// - location: IP 地理位置富化（MaxMind + 缓存）
/// - redis: Redis 连接（location 缓存使用 redis store 时）
/// - localization: 标签本地化
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub localization: LocalizationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 `config.toml` 和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SM，分隔符：__
    /// 示例：SM__LOCATION__ENABLED=true
    ///
    /// 加载失败时回退到默认配置。
    pub fn load() -> Self {
        match Self::load_from(DEFAULT_CONFIG_PATH) {
            Ok(config) => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", DEFAULT_CONFIG_PATH);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 从指定文件（可不存在）和环境变量加载配置
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<AppConfig>()?)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::SessionManagerError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 宿主应用的会话生命周期（分钟），活跃会话与清理的截止时间都由它计算
    #[serde(default = "default_session_lifetime")]
    pub lifetime_minutes: u64,
    /// 元数据写入节流间隔（秒）
    #[serde(default = "default_throttle_seconds")]
    pub throttle_seconds: u64,
    /// 宿主应用的 session 驱动。为 "database" 时中间件不做任何事
    #[serde(default = "default_session_driver")]
    pub driver: String,
}

impl SessionConfig {
    /// 超过 [`MAX_LIFETIME_MINUTES`] 时截断
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lifetime_minutes.min(MAX_LIFETIME_MINUTES) as i64)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_secs(self.throttle_seconds)
    }

    pub fn uses_database_driver(&self) -> bool {
        self.driver.eq_ignore_ascii_case("database")
    }
}

/// IP 地理位置富化配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub cache: LocationCacheConfig,
    #[serde(default)]
    pub maxmind: MaxMindConfig,
}

/// IP 位置缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 缓存 key 前缀，最终 key 为 `{key}:{sha256(ip)}`
    #[serde(default = "default_location_cache_key")]
    pub key: String,
    /// 秒。7 天：IP 归属变化不频繁，同时避免长期追踪
    #[serde(default = "default_location_cache_ttl")]
    pub ttl: u64,
    /// 缓存后端覆盖：memory（默认）、redis、null
    #[serde(default)]
    pub store: Option<String>,
    /// memory 后端最大条目数
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

impl LocationCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    pub fn store_name(&self) -> &str {
        self.store.as_deref().unwrap_or("memory")
    }
}

/// MaxMind 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxMindConfig {
    /// GeoLite2-City.mmdb 路径
    #[serde(default = "default_maxmind_path")]
    pub database_path: Option<String>,
    /// 是否保存经纬度（出于隐私考虑默认关闭）
    #[serde(default)]
    pub store_coordinates: bool,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

/// 本地化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// 调用方未指定 locale 时使用
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// 找不到对应 locale 的文案时回退
    #[serde(default = "default_locale")]
    pub fallback_locale: String,
    /// 额外的 `<locale>.toml` 文案目录
    #[serde(default)]
    pub lang_path: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_database_url() -> String {
    "sessions.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_session_lifetime() -> u64 {
    120
}

fn default_throttle_seconds() -> u64 {
    60
}

fn default_session_driver() -> String {
    "redis".to_string()
}

fn default_location_cache_key() -> String {
    "session_manager:ip_location".to_string()
}

fn default_location_cache_ttl() -> u64 {
    60 * 60 * 24 * 7
}

fn default_memory_capacity() -> u64 {
    10_000
}

fn default_maxmind_path() -> Option<String> {
    Some("storage/app/geoip/GeoLite2-City.mmdb".to_string())
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_minutes: default_session_lifetime(),
            throttle_seconds: default_throttle_seconds(),
            driver: default_session_driver(),
        }
    }
}

impl Default for LocationCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: default_location_cache_key(),
            ttl: default_location_cache_ttl(),
            store: None,
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for MaxMindConfig {
    fn default() -> Self {
        Self {
            database_path: default_maxmind_path(),
            store_coordinates: false,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            fallback_locale: default_locale(),
            lang_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
