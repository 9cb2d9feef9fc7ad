//! Bounded conversion cache
//!
//! Evicts the oldest inserted entry once the capacity is exceeded. Lookups
//! do not refresh an entry's position, so this is insertion order, not LRU.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

use super::schema::Permissions;

/// Stored conversion result
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Strings(Vec<String>),
    Permissions(Permissions),
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CachedValue>,
    order: VecDeque<String>,
}

/// Conversion cache shared by converters
///
/// Values are cloned out on lookup; a stored value is never handed out by
/// reference.
#[derive(Debug)]
pub struct ConversionCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl ConversionCache {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &str) -> Option<CachedValue> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Store a value, evicting the oldest entry when over capacity
    ///
    /// Re-inserting an existing key replaces the value in place.
    pub fn insert(&self, key: String, value: CachedValue) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, value);

        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConversionCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Cache key `"<operation>:<serialized input>"`
///
/// Object keys serialize in sorted order, so deep-equal inputs share a key.
/// If serialization fails the key falls back to the input's shape.
pub fn cache_key(operation: &str, input: &Value) -> String {
    match serde_json::to_string(input) {
        Ok(serialized) => format!("{}:{}", operation, serialized),
        Err(_) => format!("{}:{}", operation, shape_key(input)),
    }
}

fn shape_key(input: &Value) -> String {
    match input {
        Value::Object(object) => {
            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            format!("{{{}}}", keys.join(","))
        }
        Value::Array(items) => format!("[{}]", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}
