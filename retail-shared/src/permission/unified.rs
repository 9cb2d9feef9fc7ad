//! Shape detection for permissions received from the API
//!
//! Role payloads arrive as wire arrays, API CRUD objects
//! (`view/create/update/delete`), canonical objects or the old
//! administrator/manager shape. [`classify`] names the shape so the
//! converter can match on it exhaustively.

use serde_json::{Map, Value};

use super::access_level::{AccessLevel, convert_numeric_access_level};
use super::codec::{Converted, is_legacy_object};
use super::schema::{FieldKind, FieldValue, ModuleKey, ModulePermissions, Permissions};
use crate::error::ConversionWarning;

/// API CRUD key and the canonical field it fills
const CRUD_MAPPING: [(&str, &str); 4] = [
    ("view", "view"),
    ("create", "create"),
    ("update", "edit"),
    ("delete", "delete"),
];

/// Detected input shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PermissionInput<'a> {
    /// JSON null
    Missing,
    /// Wire format
    StringArray(&'a [Value]),
    /// `sales` is an object with `view` or `create`
    ApiCrud(&'a Map<String, Value>),
    /// Has both `sales` and `inventory`
    Canonical(&'a Map<String, Value>),
    /// Has `administrator` or `manager`
    Legacy(&'a Map<String, Value>),
    Unrecognized,
}

/// Name the shape of `input`; the first matching rule wins
pub fn classify(input: &Value) -> PermissionInput<'_> {
    match input {
        Value::Null => PermissionInput::Missing,
        Value::Array(items) => PermissionInput::StringArray(items),
        Value::Object(object) => {
            let api_sales = object
                .get("sales")
                .and_then(Value::as_object)
                .is_some_and(|sales| sales.contains_key("view") || sales.contains_key("create"));

            if api_sales {
                PermissionInput::ApiCrud(object)
            } else if object.contains_key("sales") && object.contains_key("inventory") {
                PermissionInput::Canonical(object)
            } else if is_legacy_object(object) {
                PermissionInput::Legacy(object)
            } else {
                PermissionInput::Unrecognized
            }
        }
        _ => PermissionInput::Unrecognized,
    }
}

/// Lenient level parsing for API payloads
///
/// Strings are matched case-insensitively (`all`, `department`/`dept`,
/// `self`, `none`). Integers 0 to 5 go through the legacy numeric bridge and
/// 6, the code [`convert_string_access_level`] writes for `self`, stays
/// `SelfOnly`. Everything else is `None`.
///
/// [`convert_string_access_level`]: super::access_level::convert_string_access_level
pub fn map_access_level(value: Option<&Value>) -> AccessLevel {
    match value {
        Some(Value::String(s)) => match s.to_ascii_uppercase().as_str() {
            "ALL" => AccessLevel::All,
            "DEPARTMENT" | "DEPT" => AccessLevel::Department,
            "SELF" => AccessLevel::SelfOnly,
            _ => AccessLevel::None,
        },
        Some(Value::Number(n)) => match n.as_i64() {
            Some(6) => AccessLevel::SelfOnly,
            Some(code @ 0..=5) => convert_numeric_access_level(code),
            _ => AccessLevel::None,
        },
        _ => AccessLevel::None,
    }
}

/// Build permissions from the API CRUD shape
///
/// Each known module gets its four CRUD levels from
/// `view/create/update/delete` (missing keys mean `none`), then every other
/// key that names a field of the module is copied over. Flags only accept
/// JSON booleans; graded fields go through [`map_access_level`].
pub fn from_api_crud(object: &Map<String, Value>) -> Converted {
    let mut permissions = Permissions::default();
    let mut warnings = Vec::new();

    for (name, value) in object {
        let Some(key) = ModuleKey::from_name(name) else {
            warnings.push(ConversionWarning::UnknownModule {
                module: name.clone(),
            });
            continue;
        };
        let Some(fields) = value.as_object() else {
            warnings.push(ConversionWarning::TypeMismatch {
                module: name.clone(),
                field: String::new(),
            });
            continue;
        };

        let module = permissions.module_mut(key);
        for (api_key, field) in CRUD_MAPPING {
            module.set(field, FieldValue::Level(map_access_level(fields.get(api_key))));
        }

        for (field, value) in fields {
            if CRUD_MAPPING.iter().any(|(api_key, _)| *api_key == field.as_str()) {
                continue;
            }
            let mapped = match module.field_kind(field) {
                Some(FieldKind::Flag) => value.as_bool().map(FieldValue::Flag),
                Some(FieldKind::Level) => Some(FieldValue::Level(map_access_level(Some(value)))),
                None => {
                    warnings.push(ConversionWarning::UnknownField {
                        module: name.clone(),
                        field: field.clone(),
                    });
                    continue;
                }
            };
            match mapped {
                Some(mapped) => {
                    module.set(field, mapped);
                }
                None => warnings.push(ConversionWarning::TypeMismatch {
                    module: name.clone(),
                    field: field.clone(),
                }),
            }
        }
    }

    Converted {
        permissions,
        warnings,
    }
}
