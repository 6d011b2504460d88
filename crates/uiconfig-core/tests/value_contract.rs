//! Contract Test: Primitive Value Protocol
//!
//! This test verifies that clone, equality and in-place copy behave the same
//! for every value shape the pipeline handles.
//!
//! Constraints verified:
//! - A clone equals its source and is independent of it
//! - Scalars clone to themselves
//! - Copying into a shorter or longer array resizes it in place
//! - Protocol objects are copied into, not replaced
//!
//! If this test fails, reads and undo snapshots can alias live data.

mod common;

use common::*;
use uiconfig_core::value::{copy_into, deep_clone, values_equal, ArrayRef, Value};

fn numbers(items: &[f64]) -> Value {
    Value::array(items.iter().map(|n| Value::from(*n)))
}

#[test]
fn clone_equals_source_for_every_shape() {
    let samples = vec![
        Value::Null,
        Value::from(true),
        Value::from(42),
        Value::from("text"),
        numbers(&[1.0, 2.0, 3.0]),
        Value::array(vec![numbers(&[1.0]), Value::from("nested")]),
        Value::object(Vec3::new(1.0, 2.0, 3.0)),
    ];

    for value in samples {
        let cloned = deep_clone(&value);
        assert!(values_equal(&cloned, &value), "clone of {:?} differs", value);
    }
}

#[test]
fn scalar_clone_is_the_same_value() {
    for value in [Value::from(1.5), Value::from("s"), Value::from(false)] {
        assert_eq!(deep_clone(&value), value);
    }
}

#[test]
fn mutating_a_clone_leaves_the_source_alone() {
    let source = numbers(&[1.0, 2.0]);
    let cloned = deep_clone(&source);
    cloned.as_array().unwrap().push(Value::from(3));
    assert_eq!(source.as_array().unwrap().len(), 2);

    let vec = Vec3::new(1.0, 2.0, 3.0);
    let cloned = deep_clone(&Value::object(vec.clone()));
    assert!(cloned.as_object().unwrap().set("x", Value::from(10)));
    assert_eq!(vec.components(), [1.0, 2.0, 3.0]);
}

#[test]
fn copy_grows_shorter_array_in_place() {
    let target = ArrayRef::new(vec![Value::from(1)]);
    let source = numbers(&[4.0, 5.0, 6.0]);

    let result = copy_into(Value::from(target.clone()), &source);

    assert!(result.same_instance(&Value::from(target.clone())));
    assert_eq!(target.len(), 3);
    assert!(values_equal(&result, &source));
}

#[test]
fn copy_truncates_longer_array_in_place() {
    let target = ArrayRef::new(vec![Value::from(1), Value::from(2), Value::from(3)]);
    let source = numbers(&[9.0]);

    let result = copy_into(Value::from(target.clone()), &source);

    assert!(result.same_instance(&Value::from(target.clone())));
    assert_eq!(target.snapshot(), vec![Value::from(9)]);
}

#[test]
fn copy_into_protocol_object_keeps_identity() {
    let target = Vec3::new(0.0, 0.0, 0.0);
    let source = Value::object(Vec3::new(1.0, 2.0, 3.0));

    let result = copy_into(Value::object(target.clone()), &source);

    assert!(result.same_instance(&Value::object(target.clone())));
    assert_eq!(target.components(), [1.0, 2.0, 3.0]);
    assert!(!result.same_instance(&source));
}

#[test]
fn copy_between_different_shapes_returns_a_clone() {
    let source = numbers(&[1.0, 2.0]);
    let result = copy_into(Value::from(3), &source);
    assert!(values_equal(&result, &source));
    assert!(!result.same_instance(&source));
}
