use woothee::parser::Parser;

use super::{DeviceParser, SessionDevice};

/// 基于 woothee 的 UA 解析
pub struct WootheeDeviceParser {
    parser: Parser,
}

impl WootheeDeviceParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }
}

impl Default for WootheeDeviceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// woothee 用 `UNKNOWN` 或空串表示未识别
fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.to_string())
    }
}

impl DeviceParser for WootheeDeviceParser {
    fn parse(&self, user_agent: &str) -> SessionDevice {
        if user_agent.trim().is_empty() {
            return SessionDevice::default();
        }

        let result = self.parser.parse(user_agent).unwrap_or_default();

        let is_tablet = result.os == "iPad"
            || (result.os == "Android" && !user_agent.contains("Mobile"))
            || user_agent.contains("Tablet");
        let is_robot = result.category == "crawler";
        let is_mobile =
            is_tablet || matches!(result.category, "smartphone" | "mobilephone");
        let is_desktop = !is_tablet && result.category == "pc";

        let device = match result.os {
            "iPhone" | "iPad" | "iPod" => Some(result.os.to_string()),
            "Mac OSX" => Some("Macintosh".to_string()),
            _ => known(result.vendor).filter(|_| !is_robot),
        };

        SessionDevice {
            browser: known(result.name),
            browser_version: known(result.version),
            platform: known(result.os),
            platform_version: known(&result.os_version),
            device,
            is_desktop,
            is_mobile,
            is_tablet,
            is_robot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const GOOGLEBOT: &str =
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_desktop_browser() {
        let device = WootheeDeviceParser::new().parse(CHROME_WINDOWS);
        assert_eq!(device.browser.as_deref(), Some("Chrome"));
        assert!(device.browser_version.is_some());
        assert!(device.platform.as_deref().unwrap().starts_with("Windows"));
        assert!(device.is_desktop);
        assert!(!device.is_mobile);
        assert!(!device.is_tablet);
        assert!(!device.is_robot);
    }

    #[test]
    fn test_iphone() {
        let device = WootheeDeviceParser::new().parse(SAFARI_IPHONE);
        assert_eq!(device.browser.as_deref(), Some("Safari"));
        assert_eq!(device.platform.as_deref(), Some("iPhone"));
        assert_eq!(device.device.as_deref(), Some("iPhone"));
        assert!(device.is_mobile);
        assert!(!device.is_tablet);
        assert!(!device.is_desktop);
    }

    #[test]
    fn test_ipad_is_tablet() {
        let device = WootheeDeviceParser::new().parse(SAFARI_IPAD);
        assert!(device.is_tablet);
        assert!(device.is_mobile);
        assert!(!device.is_desktop);
        assert_eq!(device.device.as_deref(), Some("iPad"));
    }

    #[test]
    fn test_crawler() {
        let device = WootheeDeviceParser::new().parse(GOOGLEBOT);
        assert!(device.is_robot);
        assert!(!device.is_desktop);
        assert_eq!(device.device, None);
    }

    #[test]
    fn test_unrecognized_agent() {
        let parser = WootheeDeviceParser::new();
        assert_eq!(parser.parse(""), SessionDevice::default());

        let device = parser.parse("unknown-agent/1.0");
        assert_eq!(device.platform, None);
        assert!(!device.is_desktop);
    }
}
