//! User-Agent classification into device class, browser and OS.

use woothee::parser::Parser;

use crate::domain::entities::DeviceClass;
use crate::domain::entities::click::OTHER;

/// Client attributes derived from a User-Agent header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub device_class: DeviceClass,
    pub browser: String,
    pub os: String,
}

/// Classifies a User-Agent string using woothee.
///
/// Tablets are not a woothee category: iPads and Android devices without the
/// `Mobile` token are reported as [`DeviceClass::Tablet`].
pub fn classify_user_agent(user_agent: &str) -> ClientInfo {
    let parser = Parser::new();
    let Some(result) = parser.parse(user_agent) else {
        return ClientInfo {
            device_class: DeviceClass::Other,
            browser: OTHER.to_string(),
            os: OTHER.to_string(),
        };
    };

    let device_class = match result.category {
        _ if result.os == "iPad" => DeviceClass::Tablet,
        _ if result.os == "Android" && !user_agent.contains("Mobile") => DeviceClass::Tablet,
        "pc" => DeviceClass::Desktop,
        "smartphone" | "mobilephone" => DeviceClass::Mobile,
        _ => DeviceClass::Other,
    };

    ClientInfo {
        device_class,
        browser: known_or_other(result.name),
        os: os_family(result.os),
    }
}

fn known_or_other(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        OTHER.to_string()
    } else {
        value.to_string()
    }
}

/// Collapses woothee OS names into the families shown in analytics.
fn os_family(os: &str) -> String {
    match os {
        "iPhone" | "iPad" | "iPod" => "iOS".to_string(),
        "Mac OSX" => "macOS".to_string(),
        _ if os.starts_with("Windows") => "Windows".to_string(),
        _ => known_or_other(os),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const CHROME_ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const CHROME_ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn test_desktop_chrome() {
        let info = classify_user_agent(CHROME_WINDOWS);
        assert_eq!(info.device_class, DeviceClass::Desktop);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
    }

    #[test]
    fn test_iphone_is_mobile_ios() {
        let info = classify_user_agent(SAFARI_IPHONE);
        assert_eq!(info.device_class, DeviceClass::Mobile);
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn test_android_phone_vs_tablet() {
        assert_eq!(
            classify_user_agent(CHROME_ANDROID_PHONE).device_class,
            DeviceClass::Mobile
        );
        assert_eq!(
            classify_user_agent(CHROME_ANDROID_TABLET).device_class,
            DeviceClass::Tablet
        );
    }

    #[test]
    fn test_unparseable_user_agent() {
        let info = classify_user_agent("");
        assert_eq!(info.device_class, DeviceClass::Other);
        assert_eq!(info.browser, "Other");
        assert_eq!(info.os, "Other");
    }

    #[test]
    fn test_os_family_mapping() {
        assert_eq!(os_family("Mac OSX"), "macOS");
        assert_eq!(os_family("Windows 10"), "Windows");
        assert_eq!(os_family("iPad"), "iOS");
        assert_eq!(os_family("Linux"), "Linux");
        assert_eq!(os_family("UNKNOWN"), "Other");
    }
}
