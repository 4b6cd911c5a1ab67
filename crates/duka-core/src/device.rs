//! # Device Classification
//!
//! Classifies a request into a device class from a single header value.
//! The class is computed once per request, carried in the
//! [`RequestContext`](crate::context::RequestContext), and never persisted.
//!
//! ## Classification Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why Tablet Patterns Run First                        │
//! │                                                                         │
//! │  Header: "Mozilla/5.0 (Linux; Android 13; SM-X200 Tablet)"             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Tablet patterns: ["ipad", "tablet", ...]  ──► "tablet" MATCHES        │
//! │       │                                                                 │
//! │       ▼                                         (stop here)             │
//! │  Mobile patterns: ["mobile", "android", ...]   would ALSO match        │
//! │                                                 "android" - too broad   │
//! │                                                                         │
//! │  Tablet UA strings are a superset of mobile markers, so the more       │
//! │  specific list must win. First matching pattern decides the class.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Matching is case-insensitive substring containment. When detection is
//! disabled, or the header is absent, or nothing matches, the class is
//! [`DeviceClass::Web`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Device Class
// =============================================================================

/// Per-request device classification used to pick a pagination strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Desktop browsers and unknown callers. The baseline class.
    Web,
    /// Phones and other small-screen devices.
    Mobile,
    /// Tablets. Checked before mobile because their headers usually carry
    /// mobile markers too.
    Tablet,
}

impl Default for DeviceClass {
    fn default() -> Self {
        DeviceClass::Web
    }
}

// =============================================================================
// Detection Configuration
// =============================================================================

/// Device detection configuration.
///
/// Loaded once at startup (see [`crate::config::DukaConfig`]) and shared
/// read-only across requests.
///
/// ## Example
/// ```rust
/// use duka_core::device::{DeviceClass, DeviceDetectConfig};
///
/// let detect = DeviceDetectConfig::default();
/// assert_eq!(detect.classify(Some("iPhone OS 16")), DeviceClass::Mobile);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDetectConfig {
    /// Global switch. When false, every caller classifies as Web.
    pub enabled: bool,

    /// Name of the request header carrying the device signal.
    /// Default: "user-agent"
    pub header_name: String,

    /// Ordered tablet patterns. Checked FIRST (more specific).
    pub tablet_patterns: Vec<String>,

    /// Ordered mobile patterns. Checked after tablet patterns.
    pub mobile_patterns: Vec<String>,
}

impl Default for DeviceDetectConfig {
    fn default() -> Self {
        DeviceDetectConfig {
            enabled: true,
            header_name: "user-agent".to_string(),
            tablet_patterns: default_tablet_patterns(),
            mobile_patterns: default_mobile_patterns(),
        }
    }
}

/// Built-in tablet patterns.
pub fn default_tablet_patterns() -> Vec<String> {
    ["ipad", "tablet", "kindle", "silk", "playbook"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Built-in mobile patterns.
///
/// "android" appears here, not in the tablet list; Android tablets are
/// caught by the "tablet" marker first.
pub fn default_mobile_patterns() -> Vec<String> {
    [
        "mobile",
        "android",
        "iphone",
        "ipod",
        "blackberry",
        "opera mini",
        "windows phone",
        "webos",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl DeviceDetectConfig {
    /// Disables detection entirely (all callers become Web).
    pub fn disabled() -> Self {
        DeviceDetectConfig {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets the header name the transport should read the signal from.
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Classifies a raw header value into a device class.
    ///
    /// ## Rules
    /// - Detection disabled or header absent: `Web`
    /// - Tablet patterns checked first, then mobile; first match wins
    /// - Case-insensitive substring containment
    /// - No match: `Web`
    pub fn classify(&self, header_value: Option<&str>) -> DeviceClass {
        if !self.enabled {
            return DeviceClass::Web;
        }

        let Some(value) = header_value else {
            return DeviceClass::Web;
        };
        let value = value.to_lowercase();

        // Tablet before mobile: a header matching both must classify as
        // tablet.
        if self.tablet_patterns.iter().any(|p| value.contains(p.as_str())) {
            return DeviceClass::Tablet;
        }
        if self.mobile_patterns.iter().any(|p| value.contains(p.as_str())) {
            return DeviceClass::Mobile;
        }

        DeviceClass::Web
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
