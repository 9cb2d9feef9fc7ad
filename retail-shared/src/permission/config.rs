//! Converter configuration

use super::cache::ConversionCache;

/// Settings for [`PermissionConverter`](super::converter::PermissionConverter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Maximum number of cached conversions
    pub cache_capacity: usize,
    /// When false every call converts from scratch
    pub cache_enabled: bool,
}

impl ConverterConfig {
    pub fn new() -> Self {
        Self {
            cache_capacity: ConversionCache::DEFAULT_CAPACITY,
            cache_enabled: true,
        }
    }

    /// Read `PERMISSION_CACHE_CAPACITY` and `PERMISSION_CACHE_ENABLED`,
    /// falling back to the defaults for unset or unparseable values
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            cache_capacity: std::env::var("PERMISSION_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            cache_enabled: std::env::var("PERMISSION_CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_enabled),
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::new()
    }
}
