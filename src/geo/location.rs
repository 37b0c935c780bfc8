//! 会话位置值类型及其展示逻辑

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LocationConfidence;
use crate::i18n::{Localizer, MessageKey};

/// 默认数据来源标记
const DEFAULT_SOURCE: &str = "maxmind";

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// 经纬度，只能成对出现
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// 一次位置解析的结果（可能不完整）
///
/// 构造后不再修改；缓存后原样返回直到 TTL 过期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLocation {
    /// ISO 3166-1 alpha-2 国家代码
    pub country_code: Option<String>,
    /// 最细一级行政区名称
    pub region: Option<String>,
    pub city: Option<String>,
    /// IANA 时区，例如 `Europe/Paris`
    pub timezone: Option<String>,
    /// 仅在启用坐标存储时填充
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub confidence: Option<LocationConfidence>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for SessionLocation {
    fn default() -> Self {
        Self {
            country_code: None,
            region: None,
            city: None,
            timezone: None,
            coordinates: None,
            confidence: None,
            source: default_source(),
        }
    }
}

/// [`SessionLocation::label`] 的选项
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelOptions<'a> {
    /// 追加本地化国家名（失败时使用原始代码）
    pub include_country: bool,
    /// 追加 ` (<时区名>)`
    pub with_timezone: bool,
    /// `None` 时使用 localizer 的默认语言
    pub locale: Option<&'a str>,
}

impl<'a> LabelOptions<'a> {
    pub fn with_country(mut self) -> Self {
        self.include_country = true;
        self
    }

    pub fn with_timezone(mut self) -> Self {
        self.with_timezone = true;
        self
    }

    pub fn locale(mut self, locale: &'a str) -> Self {
        self.locale = Some(locale);
        self
    }
}

impl SessionLocation {
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }

    /// 除 HIGH 以外都是近似位置，未知精度同样视为近似
    pub fn is_approximate(&self) -> bool {
        self.confidence.is_none_or(|c| c.is_approximate())
    }

    pub fn confidence_label(&self, l10n: &dyn Localizer, locale: Option<&str>) -> String {
        match self.confidence {
            Some(confidence) => confidence.label(l10n, locale),
            None => {
                let locale = locale.unwrap_or_else(|| l10n.default_locale());
                l10n.translate(locale, MessageKey::ConfidenceApproximate, &[])
            }
        }
    }

    pub fn confidence_icon(&self) -> &'static str {
        self.confidence.map_or("○", |c| c.icon())
    }

    pub fn confidence_icon_key(&self) -> &'static str {
        self.confidence.map_or("accuracy-low", |c| c.icon_key())
    }

    /// 人类可读的位置标签，例如 `San Francisco, California`
    ///
    /// 没有任何可用部分时返回本地化的 "unknown location"。
    pub fn label(&self, l10n: &dyn Localizer, opts: LabelOptions<'_>) -> String {
        let locale = opts.locale.unwrap_or_else(|| l10n.default_locale());
        match self.label_parts(l10n, &opts, locale) {
            Some(label) => label,
            None => l10n.translate(locale, MessageKey::UnknownLocation, &[]),
        }
    }

    /// 同 [`label`](Self::label)，但近似位置会包进本地化的 "Near :location"
    pub fn label_with_confidence(&self, l10n: &dyn Localizer, opts: LabelOptions<'_>) -> String {
        let locale = opts.locale.unwrap_or_else(|| l10n.default_locale());
        match self.label_parts(l10n, &opts, locale) {
            Some(label) if self.is_approximate() => {
                l10n.translate(locale, MessageKey::NearLocation, &[("location", &label)])
            }
            Some(label) => label,
            None => l10n.translate(locale, MessageKey::UnknownLocation, &[]),
        }
    }

    fn label_parts(
        &self,
        l10n: &dyn Localizer,
        opts: &LabelOptions<'_>,
        locale: &str,
    ) -> Option<String> {
        let country = if opts.include_country {
            self.country_name(l10n, Some(locale))
                .or_else(|| self.country_code.clone())
        } else {
            None
        };

        let parts: Vec<&str> = [self.city.as_deref(), self.region.as_deref(), country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();

        if parts.is_empty() {
            return None;
        }

        let mut label = parts.join(", ");

        if opts.with_timezone {
            if let Some(tz) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) {
                let name = self
                    .timezone_label(l10n, Some(locale))
                    .unwrap_or_else(|| tz.to_string());
                label.push_str(&format!(" ({})", name));
            }
        }

        Some(label)
    }

    /// 本地化国家名
    ///
    /// 代码会先去空白并转大写；缺失、长度不为 2 或本地化失败时返回 `None`。
    pub fn country_name(&self, l10n: &dyn Localizer, locale: Option<&str>) -> Option<String> {
        let code = self.country_code.as_deref()?.trim().to_uppercase();
        if code.chars().count() != 2 {
            return None;
        }

        let locale = locale.unwrap_or_else(|| l10n.default_locale());
        match l10n.country_name(locale, &code) {
            Ok(name) => name,
            Err(e) => {
                debug!("Country name lookup failed for {}: {}", code, e);
                None
            }
        }
    }

    /// 本地化的时区通用名称，例如 `Eastern Time`
    pub fn timezone_label(&self, l10n: &dyn Localizer, locale: Option<&str>) -> Option<String> {
        let timezone = self.timezone.as_deref().filter(|tz| !tz.is_empty())?;
        let locale = locale.unwrap_or_else(|| l10n.default_locale());

        match l10n.timezone_name(locale, timezone) {
            Ok(name) => name,
            Err(e) => {
                debug!("Timezone label lookup failed for {}: {}", timezone, e);
                None
            }
        }
    }
}
