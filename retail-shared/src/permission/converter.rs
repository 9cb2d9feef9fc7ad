//! Cached, fail-safe permission converter
//!
//! Wraps the base converters in [`codec`](super::codec) with a
//! [`ConversionCache`] and collapses every failure to the allow-nothing
//! default: missing input, malformed input and conversion errors all come
//! back as `[]` or [`Permissions::default`]. Nothing here returns an error.

use serde_json::Value;
use std::sync::{Arc, OnceLock};

use super::cache::{CachedValue, ConversionCache, cache_key};
use super::codec::{self, Converted};
use super::config::ConverterConfig;
use super::schema::Permissions;
use super::unified::{PermissionInput, classify, from_api_crud};
use crate::error::ConversionResult;

const OP_TO_ARRAY: &str = "toArray";
const OP_TO_OBJECT: &str = "toObject";
const OP_LEGACY: &str = "legacy";
const OP_UNIFIED: &str = "unified";

/// Permission converter with an injectable cache
#[derive(Debug, Clone)]
pub struct PermissionConverter {
    cache: Arc<ConversionCache>,
    cache_enabled: bool,
}

impl PermissionConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            cache: Arc::new(ConversionCache::new(config.cache_capacity)),
            cache_enabled: config.cache_enabled,
        }
    }

    /// Converter backed by an existing cache
    pub fn with_cache(cache: Arc<ConversionCache>) -> Self {
        Self {
            cache,
            cache_enabled: true,
        }
    }

    pub fn cache(&self) -> &Arc<ConversionCache> {
        &self.cache
    }

    /// Drop every cached conversion
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Encode permissions for the wire; `None` encodes to `[]`
    pub fn permissions_to_string_array(&self, permissions: Option<&Permissions>) -> Vec<String> {
        let Some(permissions) = permissions else {
            return Vec::new();
        };

        let key = serde_json::to_value(permissions)
            .ok()
            .map(|value| cache_key(OP_TO_ARRAY, &value));
        if let Some(CachedValue::Strings(cached)) = key.as_deref().and_then(|k| self.lookup(k)) {
            return cached;
        }

        let encoded = codec::permissions_to_string_array(permissions);
        if let Some(key) = key {
            self.store(key, CachedValue::Strings(encoded.clone()));
        }
        encoded
    }

    /// Decode wire entries (or an already decoded object) on top of `default`
    pub fn string_array_to_permissions(
        &self,
        input: Option<&Value>,
        default: Option<&Permissions>,
    ) -> Permissions {
        let fallback = || default.cloned().unwrap_or_default();
        let Some(input) = input.filter(|v| !v.is_null()) else {
            return fallback();
        };

        let key = match default {
            Some(default) => match serde_json::to_value(default) {
                Ok(default) => Some(cache_key(
                    OP_TO_OBJECT,
                    &Value::Array(vec![input.clone(), default]),
                )),
                Err(_) => None,
            },
            None => Some(cache_key(OP_TO_OBJECT, input)),
        };

        self.cached_permissions(key, OP_TO_OBJECT, fallback, || {
            codec::string_array_to_permissions(input, default)
        })
    }

    /// Migrate legacy data; `None` gives the default
    pub fn convert_legacy_permissions(&self, input: Option<&Value>) -> Permissions {
        let Some(input) = input.filter(|v| !v.is_null()) else {
            return Permissions::default();
        };
        let key = cache_key(OP_LEGACY, input);
        self.cached_permissions(Some(key), OP_LEGACY, Permissions::default, || {
            codec::convert_legacy_permissions(input)
        })
    }

    /// Normalize permissions of any known shape to the canonical form
    pub fn normalize(&self, input: Option<&Value>) -> Permissions {
        let Some(input) = input else {
            return Permissions::default();
        };

        let shape = classify(input);
        if shape == PermissionInput::Missing {
            return Permissions::default();
        }

        let key = cache_key(OP_UNIFIED, input);
        if let Some(CachedValue::Permissions(cached)) = self.lookup(&key) {
            return cached;
        }

        let permissions = match shape {
            PermissionInput::Missing | PermissionInput::Unrecognized => Permissions::default(),
            PermissionInput::StringArray(_) => self.string_array_to_permissions(Some(input), None),
            PermissionInput::ApiCrud(object) => {
                let converted = from_api_crud(object);
                log_warnings(OP_UNIFIED, &converted);
                converted.permissions
            }
            PermissionInput::Canonical(_) => match Permissions::deserialize_value(input) {
                Ok(permissions) => permissions,
                Err(e) => {
                    tracing::warn!(
                        operation = OP_UNIFIED,
                        error = %e,
                        "Permission conversion failed, using defaults"
                    );
                    Permissions::default()
                }
            },
            PermissionInput::Legacy(_) => self.convert_legacy_permissions(Some(input)),
        };

        self.store(key, CachedValue::Permissions(permissions.clone()));
        permissions
    }

    /// Encode a role's permissions right before sending them to the API
    pub fn prepare_permissions_for_api(&self, permissions: &Permissions) -> Vec<String> {
        self.permissions_to_string_array(Some(permissions))
    }

    /// Normalize the `permissions` field of an API payload
    pub fn process_permissions_from_api(&self, raw: &Value) -> Permissions {
        self.normalize(Some(raw))
    }

    fn cached_permissions(
        &self,
        key: Option<String>,
        operation: &'static str,
        fallback: impl FnOnce() -> Permissions,
        convert: impl FnOnce() -> ConversionResult<Converted>,
    ) -> Permissions {
        if let Some(CachedValue::Permissions(cached)) =
            key.as_deref().and_then(|k| self.lookup(k))
        {
            return cached;
        }

        let permissions = match convert() {
            Ok(converted) => {
                log_warnings(operation, &converted);
                converted.permissions
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    error = %e,
                    "Permission conversion failed, using defaults"
                );
                fallback()
            }
        };

        if let Some(key) = key {
            self.store(key, CachedValue::Permissions(permissions.clone()));
        }
        permissions
    }

    fn lookup(&self, key: &str) -> Option<CachedValue> {
        if !self.cache_enabled {
            return None;
        }
        self.cache.get(key)
    }

    fn store(&self, key: String, value: CachedValue) {
        if self.cache_enabled {
            self.cache.insert(key, value);
        }
    }
}

impl Default for PermissionConverter {
    fn default() -> Self {
        Self::new(&ConverterConfig::default())
    }
}

fn log_warnings(operation: &'static str, converted: &Converted) {
    if !converted.warnings.is_empty() {
        tracing::debug!(
            operation,
            dropped = converted.warnings.len(),
            warnings = ?converted.warnings,
            "Ignored unrecognized permission data"
        );
    }
}

// =============================================================================
// Process-wide converter
// =============================================================================

static GLOBAL_CONVERTER: OnceLock<PermissionConverter> = OnceLock::new();

/// Shared converter configured from the environment on first use
pub fn global_converter() -> &'static PermissionConverter {
    GLOBAL_CONVERTER.get_or_init(|| PermissionConverter::new(&ConverterConfig::from_env()))
}

/// Clear the shared converter's cache
pub fn clear_permission_cache() {
    global_converter().clear_cache();
}

/// [`PermissionConverter::permissions_to_string_array`] on the shared converter
pub fn enhanced_permissions_to_string_array(permissions: Option<&Permissions>) -> Vec<String> {
    global_converter().permissions_to_string_array(permissions)
}

/// [`PermissionConverter::string_array_to_permissions`] on the shared converter
pub fn enhanced_string_array_to_permissions(
    input: Option<&Value>,
    default: Option<&Permissions>,
) -> Permissions {
    global_converter().string_array_to_permissions(input, default)
}

/// [`PermissionConverter::convert_legacy_permissions`] on the shared converter
pub fn enhanced_convert_legacy_permissions(input: Option<&Value>) -> Permissions {
    global_converter().convert_legacy_permissions(input)
}

/// [`PermissionConverter::normalize`] on the shared converter
pub fn unified_permission_converter(input: Option<&Value>) -> Permissions {
    global_converter().normalize(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::AccessLevel;
    use serde_json::json;

    fn converter() -> PermissionConverter {
        PermissionConverter::new(&ConverterConfig::new().with_cache_capacity(16))
    }

    #[test]
    fn test_null_inputs() {
        let conv = converter();
        assert!(conv.permissions_to_string_array(None).is_empty());
        assert_eq!(conv.string_array_to_permissions(None, None), Permissions::default());
        assert_eq!(
            conv.string_array_to_permissions(Some(&Value::Null), None),
            Permissions::default()
        );
        assert_eq!(conv.convert_legacy_permissions(None), Permissions::default());
        assert_eq!(conv.normalize(None), Permissions::default());
        assert_eq!(conv.normalize(Some(&Value::Null)), Permissions::default());
        assert!(conv.cache().is_empty());
    }

    #[test]
    fn test_null_returns_given_default() {
        let conv = converter();
        let mut base = Permissions::default();
        base.shops.view_all_shops = true;
        assert_eq!(conv.string_array_to_permissions(None, Some(&base)), base);
    }

    #[test]
    fn test_malformed_falls_back() {
        let conv = converter();
        let input = json!({ "sales": { "view": ["not", "a", "level"] } });
        assert_eq!(conv.string_array_to_permissions(Some(&input), None), Permissions::default());

        let mut base = Permissions::default();
        base.repairs.view = AccessLevel::SelfOnly;
        assert_eq!(conv.string_array_to_permissions(Some(&input), Some(&base)), base);
    }

    #[test]
    fn test_results_are_cached() {
        let conv = converter();
        let input = json!(["sales.view.all"]);
        let first = conv.string_array_to_permissions(Some(&input), None);
        assert_eq!(conv.cache().len(), 1);
        let second = conv.string_array_to_permissions(Some(&input), None);
        assert_eq!(first, second);
        assert_eq!(conv.cache().len(), 1);
    }

    #[test]
    fn test_default_is_part_of_key() {
        let conv = converter();
        let input = json!(["sales.view.all"]);
        let mut base = Permissions::default();
        base.staff.manage_roles = true;

        let plain = conv.string_array_to_permissions(Some(&input), None);
        let merged = conv.string_array_to_permissions(Some(&input), Some(&base));
        assert!(!plain.staff.manage_roles);
        assert!(merged.staff.manage_roles);
    }

    #[test]
    fn test_disabled_cache() {
        let conv = PermissionConverter::new(&ConverterConfig::new().with_cache_enabled(false));
        let mut perms = Permissions::default();
        perms.sales.view = AccessLevel::All;
        assert_eq!(conv.permissions_to_string_array(Some(&perms)), vec!["sales", "sales.view.all"]);
        assert!(conv.cache().is_empty());
    }

    #[test]
    fn test_mutating_result_does_not_touch_cache() {
        let conv = converter();
        let input = json!(["sales.view.self"]);
        let mut first = conv.normalize(Some(&input));
        first.sales.view = AccessLevel::All;
        let second = conv.normalize(Some(&input));
        assert_eq!(second.sales.view, AccessLevel::SelfOnly);
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(ConversionCache::new(4));
        let a = PermissionConverter::with_cache(cache.clone());
        let b = PermissionConverter::with_cache(cache.clone());
        a.normalize(Some(&json!(["inventory.adjustStock"])));
        assert_eq!(cache.len(), 2);
        b.clear_cache();
        assert!(a.cache().is_empty());
    }
}
