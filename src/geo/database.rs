//! 地理数据库抽象层

use std::net::IpAddr;

use thiserror::Error;

/// 地理数据库返回的原始字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoRecord {
    /// ISO 3166-1 alpha-2 国家代码
    pub country_code: Option<String>,
    /// 最细一级行政区（subdivision 列表的最后一项）
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Error)]
pub enum GeoLookupError {
    #[error("geo database error: {0}")]
    Database(String),
}

/// 地理数据库查询 trait
///
/// `Ok(None)` 表示数据库中没有该地址的记录。
pub trait GeoDatabase: Send + Sync {
    fn city(&self, ip: IpAddr) -> Result<Option<GeoRecord>, GeoLookupError>;

    /// 数据库名称（用于日志）
    fn name(&self) -> &'static str;
}
