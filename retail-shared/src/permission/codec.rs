//! Base permission converters
//!
//! String-array wire format, one entry per positive fact:
//!
//! - `sales`: the module grants something
//! - `sales.processRefunds`: a flag is on
//! - `sales.view.all`: a graded field is above `none`
//!
//! Flags that are off and levels at `none` are never written; their absence
//! is the value. Encoding walks modules and fields in declaration order.
//! Decoding ignores anything it does not recognize.

use serde::Deserialize;
use serde_json::Value;

use super::access_level::AccessLevel;
use super::legacy::LegacyPermissions;
use super::schema::{FieldKind, FieldValue, ModuleKey, ModulePermissions, Permissions};
use crate::error::{ConversionResult, ConversionWarning};

/// Level checked by [`has_permission`] when the caller has no stricter need
pub const DEFAULT_REQUIRED_LEVEL: AccessLevel = AccessLevel::All;

/// Conversion output together with everything that was dropped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    pub permissions: Permissions,
    pub warnings: Vec<ConversionWarning>,
}

impl Converted {
    fn clean(permissions: Permissions) -> Self {
        Self {
            permissions,
            warnings: Vec::new(),
        }
    }
}

/// Encode permissions into the string-array wire format
pub fn permissions_to_string_array(permissions: &Permissions) -> Vec<String> {
    let mut out = Vec::new();

    for key in ModuleKey::ALL {
        let module = permissions.module(key);
        if !module.has_any() {
            continue;
        }
        out.push(key.as_str().to_string());

        for spec in module.fields() {
            match module.get(spec.name) {
                Some(FieldValue::Flag(true)) => {
                    out.push(format!("{}.{}", key, spec.name));
                }
                Some(FieldValue::Level(level)) if !level.is_none() => {
                    out.push(format!("{}.{}.{}", key, spec.name, level));
                }
                _ => {}
            }
        }
    }

    out
}

/// Decode wire entries on top of `base`
///
/// - `module` changes nothing
/// - `module.field` turns a flag on, or grants `all` on a graded field
/// - `module.field.level` sets a graded field to `level`
///
/// Entries with more than three parts are dropped with a warning.
pub fn decode_string_array<S: AsRef<str>>(entries: &[S], base: &Permissions) -> Converted {
    let mut converted = Converted::clean(base.clone());
    for entry in entries {
        apply_token(
            &mut converted.permissions,
            entry.as_ref(),
            &mut converted.warnings,
        );
    }
    converted
}

fn apply_token(permissions: &mut Permissions, token: &str, warnings: &mut Vec<ConversionWarning>) {
    let mut parts = token.split('.');
    let module_name = parts.next().unwrap_or_default();
    let field = parts.next();
    let level = parts.next();
    if parts.next().is_some() {
        warnings.push(ConversionWarning::MalformedToken {
            token: token.to_string(),
        });
        return;
    }

    let Some(key) = ModuleKey::from_name(module_name) else {
        warnings.push(ConversionWarning::UnknownModule {
            module: module_name.to_string(),
        });
        return;
    };
    let Some(field) = field else {
        return;
    };

    let module = permissions.module_mut(key);
    let Some(kind) = module.field_kind(field) else {
        warnings.push(ConversionWarning::UnknownField {
            module: module_name.to_string(),
            field: field.to_string(),
        });
        return;
    };

    let value = match (kind, level) {
        (FieldKind::Flag, None) => FieldValue::Flag(true),
        (FieldKind::Level, None) => FieldValue::Level(AccessLevel::All),
        (FieldKind::Level, Some(level)) => match level.parse() {
            Ok(level) => FieldValue::Level(level),
            Err(_) => {
                warnings.push(ConversionWarning::InvalidLevel {
                    token: token.to_string(),
                });
                return;
            }
        },
        (FieldKind::Flag, Some(_)) => {
            warnings.push(ConversionWarning::TypeMismatch {
                module: module_name.to_string(),
                field: field.to_string(),
            });
            return;
        }
    };
    module.set(field, value);
}

/// Decode JSON of unknown shape into permissions
///
/// - array: decoded as wire entries on top of `default` (or a fresh default)
/// - object: taken as already decoded; it must deserialize as [`Permissions`]
/// - anything else: `default` unchanged
pub fn string_array_to_permissions(
    input: &Value,
    default: Option<&Permissions>,
) -> ConversionResult<Converted> {
    let base = default.cloned().unwrap_or_default();

    match input {
        Value::Array(items) => {
            let mut warnings = Vec::new();
            let entries: Vec<&str> = items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item.as_str() {
                    Some(s) => Some(s),
                    None => {
                        warnings.push(ConversionWarning::NonStringEntry { index });
                        None
                    }
                })
                .collect();

            let mut converted = decode_string_array(&entries, &base);
            warnings.append(&mut converted.warnings);
            converted.warnings = warnings;
            Ok(converted)
        }
        Value::Object(_) => {
            let permissions = Permissions::deserialize_value(input)?;
            Ok(Converted::clean(permissions))
        }
        _ => Ok(Converted::clean(base)),
    }
}

/// Authorization check
///
/// Flags return their raw value and ignore `required`. Graded fields pass
/// when the granted level is at least `required`. Missing permissions,
/// unknown modules and unknown fields are denied.
pub fn has_permission(
    permissions: Option<&Permissions>,
    module: &str,
    action: &str,
    required: AccessLevel,
) -> bool {
    let Some(permissions) = permissions else {
        return false;
    };
    match ModuleKey::from_name(module) {
        Some(key) => has_module_permission(permissions, key, action, required),
        None => false,
    }
}

/// [`has_permission`] for a known module
pub fn has_module_permission(
    permissions: &Permissions,
    module: ModuleKey,
    action: &str,
    required: AccessLevel,
) -> bool {
    match permissions.module(module).get(action) {
        Some(FieldValue::Flag(on)) => on,
        Some(FieldValue::Level(level)) => level.satisfies(required),
        None => false,
    }
}

/// Migrate stored permissions of an older shape
///
/// - array: wire entries, see [`string_array_to_permissions`]
/// - object with `sales` and `inventory`: already canonical
/// - object with `administrator` / `manager`: bucket leaves become
///   `administrator.<key>` / `manager.<key>` tokens and are decoded. Those
///   tokens name no current module, so this path grants nothing; each one
///   comes back as an [`ConversionWarning::UnknownModule`].
/// - anything else: default permissions
pub fn convert_legacy_permissions(input: &Value) -> ConversionResult<Converted> {
    match input {
        Value::Array(_) => string_array_to_permissions(input, None),
        Value::Object(object)
            if object.contains_key("sales") && object.contains_key("inventory") =>
        {
            Ok(Converted::clean(Permissions::deserialize_value(input)?))
        }
        Value::Object(object) if is_legacy_object(object) => {
            let tokens = LegacyPermissions::from_object(object).to_tokens();
            let converted = decode_string_array(&tokens, &Permissions::default());
            if !converted.warnings.is_empty() {
                tracing::debug!(
                    dropped = converted.warnings.len(),
                    "legacy administrator/manager grants have no module mapping"
                );
            }
            Ok(converted)
        }
        _ => Ok(Converted::default()),
    }
}

pub(crate) fn is_legacy_object(object: &serde_json::Map<String, Value>) -> bool {
    object.contains_key(super::legacy::ADMINISTRATOR_BUCKET)
        || object.contains_key(super::legacy::MANAGER_BUCKET)
}

impl Permissions {
    /// Deserialize a canonical JSON object, defaulting anything missing
    pub fn deserialize_value(value: &Value) -> ConversionResult<Self> {
        Ok(Permissions::deserialize(value)?)
    }
}
