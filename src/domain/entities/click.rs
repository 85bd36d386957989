//! Click events recorded on successful resolutions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::user_agent::classify_user_agent;

/// Placeholder used for browser/OS values that could not be determined.
pub const OTHER: &str = "Other";

/// Placeholder used for location values that are not known.
pub const UNKNOWN: &str = "Unknown";

/// Coarse device category of the client that followed a short link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Other,
}

impl DeviceClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Other => OTHER,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One successful resolution, appended to the registry's click log.
///
/// Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub entry_id: i64,
    pub timestamp: DateTime<Utc>,
    pub referrer: Option<String>,
    pub device_class: DeviceClass,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
}

/// Request metadata supplied by the caller of a resolution.
///
/// Turned into a [`ClickEvent`] only when the resolution succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickContext {
    pub referrer: Option<String>,
    pub device_class: DeviceClass,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub city: String,
    pub visitor_id: Option<String>,
}

impl Default for ClickContext {
    fn default() -> Self {
        Self {
            referrer: None,
            device_class: DeviceClass::Other,
            browser: OTHER.to_string(),
            os: OTHER.to_string(),
            country: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            visitor_id: None,
        }
    }
}

impl ClickContext {
    /// Builds a context with device, browser and OS derived from a User-Agent header.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let client = classify_user_agent(user_agent);
        Self {
            device_class: client.device_class,
            browser: client.browser,
            os: client.os,
            ..Self::default()
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.referrer = (!referrer.trim().is_empty()).then_some(referrer);
        self
    }

    pub fn with_location(mut self, country: impl Into<String>, city: impl Into<String>) -> Self {
        self.country = country.into();
        self.city = city.into();
        self
    }

    pub fn with_visitor(mut self, visitor_id: impl Into<String>) -> Self {
        self.visitor_id = Some(visitor_id.into());
        self
    }

    pub fn with_device(mut self, device_class: DeviceClass) -> Self {
        self.device_class = device_class;
        self
    }

    /// Stamps the context into a click event for `entry_id`.
    pub fn into_event(self, entry_id: i64, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent {
            entry_id,
            timestamp,
            referrer: self.referrer,
            device_class: self.device_class,
            browser: self.browser,
            os: self.os,
            country: self.country,
            city: self.city,
            visitor_id: self.visitor_id,
        }
    }
}
