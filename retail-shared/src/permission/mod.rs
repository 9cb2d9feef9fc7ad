//! Role permission model
//!
//! - [`Permissions`]: canonical per-module permission set
//! - [`codec`]: string-array wire format, authorization check, legacy migration
//! - [`PermissionConverter`]: cached converters that never fail
//! - [`classify`]: shape detection for API payloads
//!
//! # Example
//!
//! ```
//! use retail_shared::permission::{AccessLevel, PermissionConverter, has_permission};
//! use serde_json::json;
//!
//! let converter = PermissionConverter::default();
//! let perms = converter.normalize(Some(&json!(["sales", "sales.view.dept"])));
//!
//! assert!(has_permission(Some(&perms), "sales", "view", AccessLevel::SelfOnly));
//! assert!(!has_permission(Some(&perms), "sales", "view", AccessLevel::All));
//! assert_eq!(converter.prepare_permissions_for_api(&perms), vec!["sales", "sales.view.dept"]);
//! ```

pub mod access_level;
pub mod cache;
pub mod codec;
pub mod config;
pub mod converter;
pub mod legacy;
pub mod schema;
pub mod unified;

pub use access_level::{
    AccessLevel, InvalidAccessLevel, convert_numeric_access_level, convert_string_access_level,
};
pub use cache::{CachedValue, ConversionCache, cache_key};
pub use codec::{
    Converted, DEFAULT_REQUIRED_LEVEL, convert_legacy_permissions, decode_string_array,
    has_module_permission, has_permission, permissions_to_string_array,
    string_array_to_permissions,
};
pub use config::ConverterConfig;
pub use converter::{
    PermissionConverter, clear_permission_cache, enhanced_convert_legacy_permissions,
    enhanced_permissions_to_string_array, enhanced_string_array_to_permissions,
    global_converter, unified_permission_converter,
};
pub use legacy::LegacyPermissions;
pub use schema::{
    FieldKind, FieldSpec, FieldValue, ModuleKey, ModulePermissions, PermissionItem, Permissions,
    get_default_permissions,
};
pub use unified::{PermissionInput, classify, map_access_level};
