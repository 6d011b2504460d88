// # Record
//
// The built-in dynamic object. Application code that doesn't want to
// implement `ObjectValue` by hand can keep its state in records: ordered
// named fields, an optional class name for registry lookups, and optional
// read-only fields that refuse writes.

use super::{ObjectValue, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered, mutable bag of named values
///
/// # Example
///
/// ```rust
/// use uiconfig_core::value::{ObjectValue, Record, Value};
///
/// let person = Record::new()
///     .with_class("Person")
///     .with_field("name", "John")
///     .with_field("age", 30)
///     .into_shared();
///
/// assert_eq!(person.get("age"), Some(Value::from(30)));
/// assert!(person.set("age", Value::from(31)));
/// assert_eq!(person.class_name(), Some("Person"));
/// ```
#[derive(Debug, Default)]
pub struct Record {
    class: Option<String>,
    fields: RwLock<IndexMap<String, Value>>,
    read_only: RwLock<HashSet<String>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class name
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Add a field
    pub fn with_field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.write().insert(key.into(), value.into());
        self
    }

    /// Mark a field read-only
    pub fn with_read_only(self, key: impl Into<String>) -> Self {
        self.read_only.write().insert(key.into());
        self
    }

    /// Move the record behind an `Arc`
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Build a record from a JSON object; non-objects produce an empty record
    pub fn from_json(json: &serde_json::Value) -> Self {
        let record = Self::new();
        if let Some(map) = json.as_object() {
            let mut fields = record.fields.write();
            for (key, value) in map {
                fields.insert(key.clone(), Value::from_json(value));
            }
        }
        record
    }

    /// Insert or overwrite a field, ignoring the read-only set
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.write().insert(key.into(), value.into());
    }

    /// Remove a field
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.fields.write().shift_remove(key)
    }

    /// Mark a field read-only after construction
    pub fn mark_read_only(&self, key: impl Into<String>) {
        self.read_only.write().insert(key.into());
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

impl ObjectValue for Record {
    fn get(&self, key: &str) -> Option<Value> {
        self.fields.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> bool {
        if self.read_only.read().contains(key) {
            return false;
        }
        self.fields.write().insert(key.to_string(), value);
        true
    }

    fn keys(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }

    fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_field_rejects_write() {
        let record = Record::new()
            .with_field("id", 7)
            .with_read_only("id")
            .into_shared();
        assert!(!record.set("id", Value::from(8)));
        assert_eq!(record.get("id"), Some(Value::from(7)));

        // direct insert bypasses the guard
        record.insert("id", 9);
        assert_eq!(record.get("id"), Some(Value::from(9)));
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let record = Record::new()
            .with_field("b", 1)
            .with_field("a", 2)
            .with_field("c", 3);
        assert_eq!(record.keys(), vec!["b", "a", "c"]);
        record.remove("a");
        assert_eq!(record.keys(), vec!["b", "c"]);
    }
}
