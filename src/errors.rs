use std::fmt;

#[derive(Debug, Clone)]
pub enum SessionManagerError {
    CacheConnection(String),
    CacheBackendNotFound(String),
    Configuration(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
}

impl SessionManagerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SessionManagerError::CacheConnection(_) => "E001",
            SessionManagerError::CacheBackendNotFound(_) => "E002",
            SessionManagerError::Configuration(_) => "E003",
            SessionManagerError::DatabaseConfig(_) => "E004",
            SessionManagerError::DatabaseConnection(_) => "E005",
            SessionManagerError::DatabaseOperation(_) => "E006",
            SessionManagerError::FileOperation(_) => "E007",
            SessionManagerError::Validation(_) => "E008",
            SessionManagerError::NotFound(_) => "E009",
            SessionManagerError::Serialization(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SessionManagerError::CacheConnection(_) => "Cache Connection Error",
            SessionManagerError::CacheBackendNotFound(_) => "Cache Backend Not Found",
            SessionManagerError::Configuration(_) => "Configuration Error",
            SessionManagerError::DatabaseConfig(_) => "Database Configuration Error",
            SessionManagerError::DatabaseConnection(_) => "Database Connection Error",
            SessionManagerError::DatabaseOperation(_) => "Database Operation Error",
            SessionManagerError::FileOperation(_) => "File Operation Error",
            SessionManagerError::Validation(_) => "Validation Error",
            SessionManagerError::NotFound(_) => "Resource Not Found",
            SessionManagerError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SessionManagerError::CacheConnection(msg)
            | SessionManagerError::CacheBackendNotFound(msg)
            | SessionManagerError::Configuration(msg)
            | SessionManagerError::DatabaseConfig(msg)
            | SessionManagerError::DatabaseConnection(msg)
            | SessionManagerError::DatabaseOperation(msg)
            | SessionManagerError::FileOperation(msg)
            | SessionManagerError::Validation(msg)
            | SessionManagerError::NotFound(msg)
            | SessionManagerError::Serialization(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SessionManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SessionManagerError {}

// 便捷的构造函数
impl SessionManagerError {
    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::CacheConnection(msg.into())
    }

    pub fn cache_backend_not_found<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::CacheBackendNotFound(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::Configuration(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SessionManagerError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for SessionManagerError {
    fn from(err: sea_orm::DbErr) -> Self {
        SessionManagerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SessionManagerError {
    fn from(err: std::io::Error) -> Self {
        SessionManagerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SessionManagerError {
    fn from(err: serde_json::Error) -> Self {
        SessionManagerError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for SessionManagerError {
    fn from(err: redis::RedisError) -> Self {
        SessionManagerError::CacheConnection(err.to_string())
    }
}

impl From<config::ConfigError> for SessionManagerError {
    fn from(err: config::ConfigError) -> Self {
        SessionManagerError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionManagerError>;
