//! Primitive value protocol
//!
//! The binding pipeline only ever clones, compares and copies values through
//! the three functions in this module:
//!
//! - [`deep_clone`]: scalars are returned as-is, arrays are cloned
//!   element-wise, protocol objects clone themselves
//! - [`values_equal`]: scalars by value, arrays element-wise, protocol
//!   objects through their own `equals`, everything else by identity
//! - [`copy_into`]: writes the content of a source into an existing target
//!   in place when the shapes allow it, and falls back to a clone otherwise
//!
//! In-place copying lets a caller keep a stable handle (for diffing or for
//! pooled structures such as vectors or colors) instead of allocating a
//! fresh copy on every read.

use super::{same_object, ObjectRef, Value};

/// Per-instance switches of the primitive protocol
///
/// `opaque` disables the whole protocol: the object is then shared, compared
/// by identity and never copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveFlags {
    /// Treat the object as an opaque handle
    pub opaque: bool,
    /// Allow `clone_object`
    pub clone: bool,
    /// Allow `equals`
    pub equals: bool,
    /// Allow `copy_from`
    pub copy: bool,
}

impl PrimitiveFlags {
    /// Full protocol support
    pub const ENABLED: Self = Self {
        opaque: false,
        clone: true,
        equals: true,
        copy: true,
    };

    /// Protocol switched off
    pub const OPAQUE: Self = Self {
        opaque: true,
        clone: false,
        equals: false,
        copy: false,
    };
}

impl Default for PrimitiveFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// Leaf object values that know how to clone, compare and copy themselves
///
/// Implementations use interior mutability for `copy_from`.
pub trait PrimitiveObject {
    /// Independent copy of this object
    fn clone_object(&self) -> ObjectRef;

    /// Content equality with another value
    fn equals(&self, other: &Value) -> bool;

    /// Overwrite this object's content with `other`'s
    fn copy_from(&self, other: &ObjectRef);

    /// Protocol switches for this instance
    fn flags(&self) -> PrimitiveFlags {
        PrimitiveFlags::ENABLED
    }
}

fn protocol(object: &ObjectRef) -> Option<(&dyn PrimitiveObject, PrimitiveFlags)> {
    let primitive = object.primitive()?;
    let flags = primitive.flags();
    if flags.opaque {
        return None;
    }
    Some((primitive, flags))
}

/// Clone a value deeply enough that mutating the clone never affects the source
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::array(items.snapshot().iter().map(deep_clone)),
        Value::Object(object) => match protocol(object) {
            Some((primitive, flags)) if flags.clone => Value::Object(primitive.clone_object()),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Protocol equality between two values
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.ptr_eq(y),
        (Value::Array(x), Value::Array(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let (xs, ys) = (x.snapshot(), y.snapshot());
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(p, q)| values_equal(p, q))
        }
        (Value::Object(x), _) => match protocol(x) {
            Some((primitive, flags)) if flags.equals => primitive.equals(b),
            _ => matches!(b, Value::Object(y) if same_object(x, y)),
        },
        _ => false,
    }
}

/// Equality over optional values; two unset values are equal
pub fn values_equal_opt(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => values_equal(x, y),
        _ => false,
    }
}

/// Copy `source` into `target`, in place where possible
///
/// Returns `target` itself (same instance) when it was updated in place, and
/// a clone of `source` otherwise. Arrays are resized to the source length:
/// the overlapping prefix is copied recursively, a longer source appends
/// clones, a shorter source truncates.
pub fn copy_into(target: Value, source: &Value) -> Value {
    match source {
        Value::Array(src) => match target {
            Value::Array(dst) => {
                if dst.ptr_eq(src) {
                    return Value::Array(dst);
                }
                let incoming = src.snapshot();
                let mut current = dst.snapshot().into_iter();
                let mut next = Vec::with_capacity(incoming.len());
                for item in &incoming {
                    match current.next() {
                        Some(existing) => next.push(copy_into(existing, item)),
                        None => next.push(deep_clone(item)),
                    }
                }
                dst.replace(next);
                Value::Array(dst)
            }
            _ => deep_clone(source),
        },
        Value::Object(src) => match protocol(src) {
            Some((_, src_flags)) if src_flags.copy => match target {
                Value::Object(dst) => match protocol(&dst) {
                    Some((primitive, flags)) if flags.copy => {
                        if !same_object(&dst, src) {
                            primitive.copy_from(src);
                        }
                        Value::Object(dst)
                    }
                    _ => deep_clone(source),
                },
                _ => deep_clone(source),
            },
            _ => source.clone(),
        },
        _ => source.clone(),
    }
}
