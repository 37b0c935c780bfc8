//! 设备/浏览器识别
//!
//! UA 解析本身交给 woothee，这里只负责映射成 [`SessionDevice`]。

mod parser;

use serde::{Deserialize, Serialize};

pub use parser::WootheeDeviceParser;

/// User-Agent 的分类结果，`None` 表示未识别
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDevice {
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub device: Option<String>,
    pub is_desktop: bool,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_robot: bool,
}

impl SessionDevice {
    /// 例如 `Chrome on Windows 10`
    pub fn summary(&self) -> String {
        match (self.browser.as_deref(), self.platform.as_deref()) {
            (Some(browser), Some(platform)) => format!("{} on {}", browser, platform),
            (Some(browser), None) => browser.to_string(),
            (None, Some(platform)) => platform.to_string(),
            (None, None) => "Unknown device".to_string(),
        }
    }
}

/// UA 字符串 → 设备分类
pub trait DeviceParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> SessionDevice;
}
