//! Legacy permission shapes
//!
//! Roles saved by older clients used numeric access codes (see
//! [`convert_numeric_access_level`](super::access_level::convert_numeric_access_level))
//! and grouped grants under `administrator` / `manager` buckets instead of
//! the current business modules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bucket name used by the old admin role
pub const ADMINISTRATOR_BUCKET: &str = "administrator";
/// Bucket name used by the old manager role
pub const MANAGER_BUCKET: &str = "manager";

/// Old admin/manager permission shape
///
/// Leaves are arbitrary JSON; a leaf counts as granted when it is truthy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Map<String, Value>>,
}

impl LegacyPermissions {
    /// Pull the two buckets out of a raw JSON object
    ///
    /// A bucket that is not an object contributes nothing.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let bucket = |name: &str| object.get(name).and_then(Value::as_object).cloned();
        Self {
            administrator: bucket(ADMINISTRATOR_BUCKET),
            manager: bucket(MANAGER_BUCKET),
        }
    }

    /// Flatten truthy leaves into `bucket.key` tokens
    ///
    /// Administrator tokens come first, each bucket in key order.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for (name, bucket) in [
            (ADMINISTRATOR_BUCKET, &self.administrator),
            (MANAGER_BUCKET, &self.manager),
        ] {
            let Some(bucket) = bucket else { continue };
            tokens.extend(
                bucket
                    .iter()
                    .filter(|(_, value)| is_truthy(value))
                    .map(|(key, _)| format!("{}.{}", name, key)),
            );
        }
        tokens
    }
}

/// JSON truthiness: `false`, `null`, `0` and `""` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
