//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 MaxMind GeoLite2-City.mmdb 文件进行 IP 地理位置查询

use std::net::IpAddr;
use std::path::Path;

use maxminddb::{MaxMindDbError, Reader};
use tracing::trace;

use super::database::{GeoDatabase, GeoLookupError, GeoRecord};

/// 只读的 MaxMind City 数据库，打开一次后共享
pub struct MaxMindDatabase {
    reader: Reader<Vec<u8>>,
}

impl MaxMindDatabase {
    /// 从文件路径打开数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }

    /// 数据库元信息中的类型，例如 `GeoLite2-City`
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

impl GeoDatabase for MaxMindDatabase {
    fn city(&self, ip: IpAddr) -> Result<Option<GeoRecord>, GeoLookupError> {
        let result = self
            .reader
            .lookup(ip)
            .map_err(|e| GeoLookupError::Database(e.to_string()))?;
        let city: Option<maxminddb::geoip2::City> = result
            .decode()
            .map_err(|e| GeoLookupError::Database(e.to_string()))?;

        let Some(city) = city else {
            trace!("MaxMind lookup for {}: not found", ip);
            return Ok(None);
        };

        let record = GeoRecord {
            country_code: city.country.iso_code.map(String::from),
            region: city
                .subdivisions
                .last()
                .and_then(|s| s.names.english)
                .map(String::from),
            city: city.city.names.english.map(String::from),
            timezone: city.location.time_zone.map(String::from),
            latitude: city.location.latitude,
            longitude: city.location.longitude,
        };

        trace!(
            "MaxMind lookup for {}: country={:?}, region={:?}, city={:?}",
            ip, record.country_code, record.region, record.city
        );

        Ok(Some(record))
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
