//! Startup configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once at process start. Nothing here is mutated at runtime; the
//! loaded value is shared read-only across requests.

use std::env;

use serde::{Deserialize, Serialize};

use crate::device::DeviceDetectConfig;
use crate::pagination::{PageDescriptor, PageStrategy, PaginationConfig};

/// Top-level configuration for the scoping/pagination layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DukaConfig {
    /// Device classification settings.
    pub device: DeviceDetectConfig,

    /// Per device-class pagination descriptor table.
    pub pagination: PaginationConfig,
}

impl Default for DukaConfig {
    fn default() -> Self {
        DukaConfig {
            device: DeviceDetectConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl DukaConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `DEVICE_DETECTION_ENABLED` (default true; false treats everyone as web)
    /// - `DEVICE_HEADER` (default "user-agent")
    /// - `DEVICE_TABLET_PATTERNS` / `DEVICE_MOBILE_PATTERNS` (comma-separated,
    ///   ordered; tablet list is always consulted first)
    /// - `{WEB,MOBILE,TABLET}_PAGE_SIZE`, `_MAX_PAGE_SIZE`, `_PAGE_STRATEGY`
    ///   (strategy: "offset" or "cursor")
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = DukaConfig::default();

        let device = DeviceDetectConfig {
            enabled: env::var("DEVICE_DETECTION_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DEVICE_DETECTION_ENABLED".to_string()))?,

            header_name: env::var("DEVICE_HEADER")
                .unwrap_or_else(|_| defaults.device.header_name.clone()),

            tablet_patterns: pattern_list("DEVICE_TABLET_PATTERNS")
                .unwrap_or(defaults.device.tablet_patterns),

            mobile_patterns: pattern_list("DEVICE_MOBILE_PATTERNS")
                .unwrap_or(defaults.device.mobile_patterns),
        };

        let pagination = PaginationConfig {
            web: descriptor_from_env("WEB", defaults.pagination.web)?,
            mobile: descriptor_from_env("MOBILE", defaults.pagination.mobile)?,
            tablet: descriptor_from_env("TABLET", defaults.pagination.tablet)?,
        };

        Ok(DukaConfig { device, pagination })
    }
}

/// Reads an ordered, comma-separated pattern list. None when unset or blank.
fn pattern_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let patterns: Vec<String> = raw
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        None
    } else {
        Some(patterns)
    }
}

/// Reads one class's descriptor, falling back per-field to the default.
fn descriptor_from_env(prefix: &str, default: PageDescriptor) -> Result<PageDescriptor, ConfigError> {
    let size_key = format!("{prefix}_PAGE_SIZE");
    let max_key = format!("{prefix}_MAX_PAGE_SIZE");
    let strategy_key = format!("{prefix}_PAGE_STRATEGY");

    let default_page_size = match env::var(&size_key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(size_key))?,
        Err(_) => default.default_page_size,
    };

    let max_page_size = match env::var(&max_key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(max_key))?,
        Err(_) => default.max_page_size,
    };

    let strategy = match env::var(&strategy_key) {
        Ok(raw) => parse_strategy(&raw).ok_or(ConfigError::InvalidValue(strategy_key))?,
        Err(_) => default.strategy,
    };

    if default_page_size == 0 || max_page_size == 0 || default_page_size > max_page_size {
        return Err(ConfigError::InvalidDescriptor(prefix.to_string()));
    }

    Ok(PageDescriptor::new(default_page_size, max_page_size, strategy))
}

fn parse_strategy(raw: &str) -> Option<PageStrategy> {
    match raw.trim().to_lowercase().as_str() {
        "offset" => Some(PageStrategy::Offset),
        "cursor" => Some(PageStrategy::Cursor),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid pagination descriptor for class {0}")]
    InvalidDescriptor(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceClass;

    #[test]
    fn test_defaults() {
        let config = DukaConfig::default();
        assert!(config.device.enabled);
        assert_eq!(config.device.header_name, "user-agent");
        assert_eq!(config.pagination.mobile.default_page_size, 20);
        assert_eq!(config.pagination.mobile.max_page_size, 50);
        assert_eq!(
            config.pagination.strategy_for(DeviceClass::Web),
            PageStrategy::Offset
        );
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(parse_strategy("offset"), Some(PageStrategy::Offset));
        assert_eq!(parse_strategy(" Cursor "), Some(PageStrategy::Cursor));
        assert_eq!(parse_strategy("keyset"), None);
    }

    // All env-reading assertions live in this one test: `load()` reads every
    // key, so splitting these across tests would race on process-global env.
    #[test]
    fn test_load_env_overrides() {
        env::set_var("DEVICE_DETECTION_ENABLED", "true");
        env::set_var("DEVICE_HEADER", "x-device-hint");
        env::set_var("DEVICE_TABLET_PATTERNS", " Surface , foldable ");
        env::set_var("MOBILE_PAGE_SIZE", "10");
        env::set_var("MOBILE_MAX_PAGE_SIZE", "40");
        env::set_var("MOBILE_PAGE_STRATEGY", "offset");

        let config = DukaConfig::load().unwrap();

        assert_eq!(config.device.header_name, "x-device-hint");
        // Trimmed, lowercased, order preserved
        assert_eq!(config.device.tablet_patterns, vec!["surface", "foldable"]);
        // Mobile list untouched: defaults survive a partial override
        assert!(config.device.mobile_patterns.contains(&"iphone".to_string()));

        assert_eq!(config.pagination.mobile.default_page_size, 10);
        assert_eq!(config.pagination.mobile.max_page_size, 40);
        assert_eq!(config.pagination.mobile.strategy, PageStrategy::Offset);
        // Classes without overrides keep their defaults
        assert_eq!(config.pagination.web.default_page_size, 25);
        assert_eq!(
            config.pagination.strategy_for(DeviceClass::Tablet),
            PageStrategy::Cursor
        );

        // Overridden tablet list no longer classifies the built-in markers
        assert_eq!(config.device.classify(Some("iPad")), DeviceClass::Web);
        assert_eq!(
            config.device.classify(Some("Foldable Build/1")),
            DeviceClass::Tablet
        );

        env::remove_var("DEVICE_DETECTION_ENABLED");
        env::remove_var("DEVICE_HEADER");
        env::remove_var("DEVICE_TABLET_PATTERNS");
        env::remove_var("MOBILE_PAGE_SIZE");
        env::remove_var("MOBILE_MAX_PAGE_SIZE");
        env::remove_var("MOBILE_PAGE_STRATEGY");
    }

    #[test]
    fn test_descriptor_validation() {
        // default > max is rejected even when both come from defaults
        let bad = descriptor_from_env(
            "UNSET_PREFIX_FOR_TEST",
            PageDescriptor::new(100, 50, PageStrategy::Offset),
        );
        assert!(bad.is_err());
    }
}
