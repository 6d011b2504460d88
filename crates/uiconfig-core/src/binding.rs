//! Binding resolution
//!
//! Maps a declarative node onto a concrete, mutable `(container, key)`
//! location in application state. Resolution is side-effect free: it reads
//! the node's binding (or value slot, or the parent's binding), appends the
//! node's path, walks the dot segments and lands on the innermost container.
//!
//! Failures never raise: a missing segment or non-container intermediate
//! logs a warning and yields `None` ("unbound").

use crate::node::ConfigNode;
use crate::value::{same_object, ArrayRef, Key, ObjectRef, ObjectValue, Value};
use std::sync::Arc;
use tracing::warn;

/// A container a binding can point into
#[derive(Clone, Debug)]
pub enum Target {
    /// Object with named fields
    Object(ObjectRef),
    /// Array with indexed elements
    Array(ArrayRef),
}

impl Target {
    /// Wrap a type-erased object handle
    pub fn object(object: ObjectRef) -> Self {
        Target::Object(object)
    }

    /// Container view of a value, if the value is a container
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(o) => Some(Target::Object(o.clone())),
            Value::Array(a) => Some(Target::Array(a.clone())),
            _ => None,
        }
    }

    /// Read the field or element at `key`
    pub fn get(&self, key: &Key) -> Option<Value> {
        match (self, key) {
            (Target::Object(o), Key::Name(name)) => o.get(name),
            (Target::Object(o), Key::Index(i)) => o.get(&i.to_string()),
            (Target::Array(a), Key::Index(i)) => a.get(*i),
            (Target::Array(a), Key::Name(name)) => name.parse().ok().and_then(|i| a.get(i)),
        }
    }

    /// Write the field or element at `key`; returns whether the container accepted it
    pub fn set(&self, key: &Key, value: Value) -> bool {
        match (self, key) {
            (Target::Object(o), Key::Name(name)) => o.set(name, value),
            (Target::Object(o), Key::Index(i)) => o.set(&i.to_string(), value),
            (Target::Array(a), Key::Index(i)) => a.set(*i, value),
            (Target::Array(a), Key::Name(name)) => match name.parse() {
                Ok(i) => a.set(i, value),
                Err(_) => false,
            },
        }
    }

    /// The container as a value
    pub fn to_value(&self) -> Value {
        match self {
            Target::Object(o) => Value::Object(o.clone()),
            Target::Array(a) => Value::Array(a.clone()),
        }
    }

    /// Whether both targets are the same container
    pub fn same(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Object(a), Target::Object(b)) => same_object(a, b),
            (Target::Array(a), Target::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<T: ObjectValue + 'static> From<Arc<T>> for Target {
    fn from(object: Arc<T>) -> Self {
        Target::Object(object)
    }
}

impl From<ArrayRef> for Target {
    fn from(array: ArrayRef) -> Self {
        Target::Array(array)
    }
}

/// A `(container, key)` location
///
/// Before resolution the key may be a dot-delimited path; after
/// [`resolve`] it names a field of the innermost container.
#[derive(Clone, Debug)]
pub struct Binding {
    /// Container holding the value
    pub target: Target,
    /// Field name or index inside the container
    pub key: Key,
}

impl Binding {
    /// Create a binding
    pub fn new(target: impl Into<Target>, key: impl Into<Key>) -> Self {
        Self {
            target: target.into(),
            key: key.into(),
        }
    }

    /// Current value at the location
    pub fn get(&self) -> Option<Value> {
        self.target.get(&self.key)
    }

    /// Write the location; returns whether the container accepted the write
    pub fn set(&self, value: Value) -> bool {
        self.target.set(&self.key, value)
    }
}

/// Resolve a node to its concrete binding location
///
/// # Parameters
///
/// - `node`: The node to resolve
/// - `include_parent_fallback`: Whether the parent's binding may stand in
///   when the node has neither a binding nor a value slot
///
/// # Returns
///
/// - `Some(binding)`: The innermost container and final key
/// - `None`: Unbound; a warning is logged when a path segment is missing
pub fn resolve(node: &ConfigNode, include_parent_fallback: bool) -> Option<Binding> {
    let mut binding = node.binding();
    if binding.is_none() {
        binding = node
            .value_slot()
            .map(|slot| Binding::new(slot, "value"));
    }
    if binding.is_none() && include_parent_fallback {
        binding = node.parent_binding();
    }

    let Binding { target, key } = binding?;
    if key.is_empty() {
        return None;
    }

    let key = match (key, node.path()) {
        (Key::Name(name), Some(path)) if !path.is_empty() => Key::Name(format!("{name}.{path}")),
        (key, _) => key,
    };

    let (target, key) = match key {
        Key::Name(name) if name.contains('.') => walk(target, &name)?,
        key => (target, key),
    };

    match (&target, key) {
        (Target::Array(_), Key::Name(name)) => match name.parse::<usize>() {
            Ok(index) => Some(Binding { target, key: Key::Index(index) }),
            Err(_) => {
                warn!(key = %name, "Array binding key is not an index");
                None
            }
        },
        (_, key) => Some(Binding { target, key }),
    }
}

fn walk(mut target: Target, path: &str) -> Option<(Target, Key)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or_default();

    for segment in segments {
        let Some(next) = target.get(&Key::name(segment)) else {
            warn!(path, segment, "Binding path segment not found");
            return None;
        };
        let Some(container) = Target::from_value(&next) else {
            warn!(path, segment, found = next.type_name(), "Binding path segment is not a container");
            return None;
        };
        target = container;
    }

    Some((target, Key::name(last)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    fn nested() -> (Arc<Record>, Arc<Record>) {
        let inner = Record::new().with_field("x", 1).into_shared();
        let outer = Record::new().with_field("obj", inner.clone()).into_shared();
        (outer, inner)
    }

    #[test]
    fn test_resolves_innermost_container() {
        let (outer, inner) = nested();
        let node = ConfigNode::builder("number").bind(outer, "obj.x").build();
        let binding = resolve(&node, true).unwrap();
        assert!(binding.target.same(&Target::from(inner)));
        assert_eq!(binding.key, Key::name("x"));
        assert_eq!(binding.get(), Some(Value::from(1)));
    }

    #[test]
    fn test_path_is_appended() {
        let (outer, inner) = nested();
        let node = ConfigNode::builder("number").bind(outer, "obj").path("x").build();
        let binding = resolve(&node, false).unwrap();
        assert!(binding.target.same(&Target::from(inner)));
        assert_eq!(binding.key, Key::name("x"));
    }

    #[test]
    fn test_missing_segment_is_unbound() {
        let (outer, _) = nested();
        let node = ConfigNode::builder("number").bind(outer.clone(), "nope.x").build();
        assert!(resolve(&node, true).is_none());

        // a scalar in the middle of the path is not a container
        let node = ConfigNode::builder("number").bind(outer, "obj.x.y").build();
        assert!(resolve(&node, true).is_none());
    }

    #[test]
    fn test_empty_key_is_unbound() {
        let record = Record::new().into_shared();
        let node = ConfigNode::builder("input").bind(record, "").build();
        assert!(resolve(&node, true).is_none());
    }

    #[test]
    fn test_array_key_is_coerced_to_index() {
        let list = ArrayRef::new(vec![Value::from("a"), Value::from("b")]);
        let holder = Record::new().with_field("list", list.clone()).into_shared();
        let node = ConfigNode::builder("input").bind(holder, "list.1").build();
        let binding = resolve(&node, true).unwrap();
        assert_eq!(binding.key, Key::Index(1));
        assert_eq!(binding.get(), Some(Value::from("b")));

        let node = ConfigNode::builder("input").bind(list, "first").build();
        assert!(resolve(&node, true).is_none());
    }

    #[test]
    fn test_value_slot_binding() {
        let node = ConfigNode::builder("number").value(3).build();
        let binding = resolve(&node, false).unwrap();
        assert_eq!(binding.key, Key::name("value"));
        assert_eq!(binding.get(), Some(Value::from(3)));
    }

    #[test]
    fn test_parent_fallback_only_when_asked() {
        let record = Record::new().with_field("go", 1).into_shared();
        let node = ConfigNode::builder("button").build();
        let fallback = Binding::new(record, "go");
        node.set_parent_binding(Some(Arc::new(move || Some(fallback.clone()))));

        assert!(resolve(&node, false).is_none());
        assert_eq!(resolve(&node, true).unwrap().key, Key::name("go"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (outer, _) = nested();
        let node = ConfigNode::builder("number").bind(outer, "obj.x").build();
        let a = resolve(&node, true).unwrap();
        let b = resolve(&node, true).unwrap();
        assert!(a.target.same(&b.target));
        assert_eq!(a.key, b.key);
    }
}
