use serde::{Deserialize, Serialize};

use crate::i18n::{Localizer, MessageKey};

/// 位置精度等级
///
/// 由地理数据库返回了哪些字段推导而来，不单独存储。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationConfidence {
    /// 城市和最细一级行政区都已知
    High,
    /// 只有城市
    Medium,
    /// 只有国家
    Low,
}

impl LocationConfidence {
    /// 根据已解析出的字段分类，空白字符串视为缺失。
    ///
    /// 三者都缺失时返回 `None`。
    pub fn classify(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> Option<Self> {
        let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());

        match (present(city), present(region), present(country)) {
            (true, true, _) => Some(LocationConfidence::High),
            (true, false, _) => Some(LocationConfidence::Medium),
            (false, _, true) => Some(LocationConfidence::Low),
            // 只有 region 没有城市和国家时无法给出可信的精度
            _ => None,
        }
    }

    pub fn is_approximate(&self) -> bool {
        !matches!(self, LocationConfidence::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationConfidence::High => "high",
            LocationConfidence::Medium => "medium",
            LocationConfidence::Low => "low",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            LocationConfidence::High => "●",
            LocationConfidence::Medium => "◐",
            LocationConfidence::Low => "○",
        }
    }

    pub fn icon_key(&self) -> &'static str {
        match self {
            LocationConfidence::High => "accuracy-high",
            LocationConfidence::Medium => "accuracy-medium",
            LocationConfidence::Low => "accuracy-low",
        }
    }

    pub fn message_key(&self) -> MessageKey {
        match self {
            LocationConfidence::High => MessageKey::ConfidenceHigh,
            LocationConfidence::Medium => MessageKey::ConfidenceMedium,
            LocationConfidence::Low => MessageKey::ConfidenceLow,
        }
    }

    /// 本地化标签
    pub fn label(&self, l10n: &dyn Localizer, locale: Option<&str>) -> String {
        let locale = locale.unwrap_or_else(|| l10n.default_locale());
        l10n.translate(locale, self.message_key(), &[])
    }

    /// 图标的无障碍文本，与 [`label`](Self::label) 相同
    pub fn icon_label(&self, l10n: &dyn Localizer, locale: Option<&str>) -> String {
        self.label(l10n, locale)
    }
}

impl std::fmt::Display for LocationConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::CatalogLocalizer;

    #[test]
    fn test_classify() {
        assert_eq!(
            LocationConfidence::classify(Some("Austin"), Some("Texas"), Some("US")),
            Some(LocationConfidence::High)
        );
        assert_eq!(
            LocationConfidence::classify(Some("Austin"), None, Some("US")),
            Some(LocationConfidence::Medium)
        );
        assert_eq!(
            LocationConfidence::classify(None, None, Some("US")),
            Some(LocationConfidence::Low)
        );
        assert_eq!(
            LocationConfidence::classify(None, Some("Texas"), Some("US")),
            Some(LocationConfidence::Low)
        );
        assert_eq!(LocationConfidence::classify(None, None, None), None);
        assert_eq!(LocationConfidence::classify(None, Some("Texas"), None), None);
    }

    #[test]
    fn test_classify_treats_blank_as_missing() {
        assert_eq!(
            LocationConfidence::classify(Some("Austin"), Some("  "), None),
            Some(LocationConfidence::Medium)
        );
        assert_eq!(LocationConfidence::classify(Some(""), None, Some(" ")), None);
    }

    #[test]
    fn test_is_approximate() {
        assert!(!LocationConfidence::High.is_approximate());
        assert!(LocationConfidence::Medium.is_approximate());
        assert!(LocationConfidence::Low.is_approximate());
    }

    #[test]
    fn test_icons() {
        assert_eq!(LocationConfidence::High.icon(), "●");
        assert_eq!(LocationConfidence::Medium.icon(), "◐");
        assert_eq!(LocationConfidence::Low.icon(), "○");
        assert_eq!(LocationConfidence::Medium.icon_key(), "accuracy-medium");
    }

    #[test]
    fn test_labels() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(LocationConfidence::High.label(&l10n, None), "Precise location");
    }

    #[test]
    fn test_icon_label_is_plain_label() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(LocationConfidence::Low.icon_label(&l10n, None), "Rough location");
        assert_eq!(
            LocationConfidence::Medium.icon_label(&l10n, Some("fr")),
            LocationConfidence::Medium.label(&l10n, Some("fr"))
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LocationConfidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: LocationConfidence = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(back, LocationConfidence::High);
    }
}
