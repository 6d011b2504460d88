//! Dynamic values that can be bound to configuration nodes
//!
//! Application state is exposed to the binding layer through a small set of
//! value shapes:
//!
//! - scalars ([`Value::Null`], [`Value::Bool`], [`Value::Number`], [`Value::String`])
//! - shared arrays ([`ArrayRef`]) with reference identity
//! - shared objects ([`ObjectRef`]), which are either containers of named
//!   fields or leaf values implementing the [`PrimitiveObject`] protocol
//! - callables ([`Action`]), used by button-like nodes
//!
//! "Not set" is expressed as `Option<Value>::None` throughout the crate.

pub mod primitive;
pub mod record;

pub use primitive::{copy_into, deep_clone, values_equal, values_equal_opt, PrimitiveFlags, PrimitiveObject};
pub use record::Record;

use crate::node::NodeRef;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an object value
pub type ObjectRef = Arc<dyn ObjectValue>;

/// A dynamically typed value
#[derive(Clone)]
pub enum Value {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (all numbers are `f64`)
    Number(f64),
    /// String
    String(String),
    /// Shared array
    Array(ArrayRef),
    /// Shared object
    Object(ObjectRef),
    /// Callable
    Function(Action),
}

impl Value {
    /// Wrap a shared object
    pub fn object<T: ObjectValue + 'static>(object: Arc<T>) -> Self {
        Value::Object(object)
    }

    /// Create a new shared array from values
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(ArrayRef::new(items.into_iter().collect()))
    }

    /// Numeric content, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array handle, if this is an array
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Object handle, if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Callable, if this is a function
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Whether this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value counts as "set" for button dispatch
    ///
    /// Mirrors the usual truthiness rules: `false`, `0`, `NaN`, `""` and
    /// null are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Short name of the value's shape, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Whether both values are the same shared instance
    ///
    /// Scalars are never "the same instance"; arrays, objects and functions
    /// compare by pointer.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => same_object(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Build a value from JSON; objects become [`Record`]s
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json)),
            serde_json::Value::Object(_) => Value::Object(Arc::new(Record::from_json(json))),
        }
    }

    /// Best-effort JSON snapshot of the value; functions become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(a) => {
                serde_json::Value::Array(a.snapshot().iter().map(Value::to_json).collect())
            }
            Value::Object(o) => {
                let mut map = serde_json::Map::new();
                for key in o.keys() {
                    if let Some(v) = o.get(&key) {
                        map.insert(key, v.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(a) => f.debug_tuple("Array").field(&a.snapshot()).finish(),
            Value::Object(o) => f.debug_tuple("Object").field(o).finish(),
            Value::Function(_) => write!(f, "Function"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(a) => {
                let items: Vec<String> = a.snapshot().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(o) => match o.class_name() {
                Some(class) => write!(f, "[object {class}]"),
                None => write!(f, "[object]"),
            },
            Value::Function(_) => write!(f, "[function]"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(items))
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl From<Action> for Value {
    fn from(a: Action) -> Self {
        Value::Function(a)
    }
}

impl<T: ObjectValue + 'static> From<Arc<T>> for Value {
    fn from(o: Arc<T>) -> Self {
        Value::Object(o)
    }
}

/// Key of a field inside a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Named field, possibly a dot-delimited path before resolution
    Name(String),
    /// Array index
    Index(usize),
}

impl Key {
    /// Create a named key
    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }

    /// The key rendered as a field name
    pub fn as_name(&self) -> String {
        match self {
            Key::Name(n) => n.clone(),
            Key::Index(i) => i.to_string(),
        }
    }

    /// Whether the key is unusable (an empty name)
    pub fn is_empty(&self) -> bool {
        matches!(self, Key::Name(n) if n.is_empty())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(n) => write!(f, "{n}"),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// Shared, mutable array with reference identity
///
/// Cloning an `ArrayRef` clones the handle, not the contents. Use
/// [`deep_clone`] for an independent copy.
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    /// Create a new array
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Set the element at `index`
    ///
    /// Writing one past the end appends. Writing further out is rejected.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut items = self.0.write();
        if index < items.len() {
            items[index] = value;
            true
        } else if index == items.len() {
            items.push(value);
            true
        } else {
            false
        }
    }

    /// Append an element
    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Shallow copy of the current elements
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Replace all elements in place, keeping the array's identity
    pub fn replace(&self, items: Vec<Value>) {
        *self.0.write() = items;
    }

    /// Whether both handles point at the same array
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}

/// An object that can be bound to or stored in a [`Value`]
///
/// Objects are addressed by field name. Implementations use interior
/// mutability; `set` returns whether the write was accepted.
pub trait ObjectValue: Send + Sync + fmt::Debug {
    /// Read a field
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a field, returning `false` if the object refuses the write
    fn set(&self, key: &str, value: Value) -> bool {
        let _ = (key, value);
        false
    }

    /// Field names in declaration order
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Class name used to look up field descriptors in a
    /// [`ClassRegistry`](crate::registry::ClassRegistry)
    fn class_name(&self) -> Option<&str> {
        None
    }

    /// Configuration node the object provides for itself, if any
    fn ui_config(&self) -> Option<NodeRef> {
        None
    }

    /// Whether the object is an image/texture resource
    fn is_texture(&self) -> bool {
        false
    }

    /// Primitive value protocol, if the object is a leaf value
    fn primitive(&self) -> Option<&dyn PrimitiveObject> {
        None
    }

    /// Access for downcasting inside protocol implementations
    fn as_any(&self) -> &dyn Any;
}

/// Whether two object handles point at the same object
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Signature of a callable value
pub type ActionFn = dyn Fn(&[Value]) -> ClickOutcome + Send + Sync;

/// A callable stored in a value or used as a click handler / undo closure
#[derive(Clone)]
pub struct Action(Arc<ActionFn>);

impl Action {
    /// Wrap a closure
    pub fn new(f: impl Fn(&[Value]) -> ClickOutcome + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Wrap a closure that ignores arguments and returns nothing
    pub fn unit(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(move |_| {
            f();
            ClickOutcome::None
        })
    }

    /// Invoke the callable
    pub fn call(&self, args: &[Value]) -> ClickOutcome {
        (self.0)(args)
    }

    /// Whether both handles point at the same closure
    pub fn ptr_eq(&self, other: &Action) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// What a button action returned
#[derive(Debug, Clone, Default)]
pub enum ClickOutcome {
    /// Nothing reversible
    #[default]
    None,
    /// A bare undo function; redo re-invokes the original action
    Undo(Action),
    /// An explicit reversible contract
    Reversible(Reversible),
}

/// `{action, undo, redo}` triple returned by a click handler
///
/// `action` is invoked immediately after the handler returns. When `redo`
/// is absent, `action` doubles as the redo closure.
#[derive(Debug, Clone, Default)]
pub struct Reversible {
    /// Work to perform now
    pub action: Option<Action>,
    /// Reverses the work
    pub undo: Option<Action>,
    /// Re-applies the work
    pub redo: Option<Action>,
}
