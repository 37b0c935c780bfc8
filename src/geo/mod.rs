//! IP 地理位置富化
//!
//! - `database`: 地理数据库抽象（原始字段）
//! - `maxmind`: MaxMind GeoLite2-City 实现
//! - `resolver`: 缓存 + 精度分类
//! - `location` / `confidence`: 值类型与展示逻辑

mod confidence;
pub mod database;
mod location;
pub mod maxmind;
pub mod resolver;

pub use confidence::LocationConfidence;
pub use database::{GeoDatabase, GeoLookupError, GeoRecord};
pub use location::{Coordinates, LabelOptions, SessionLocation};
pub use maxmind::MaxMindDatabase;
pub use resolver::{CachedIpLocationResolver, IpLocationResolver, ResolverSettings};
