//! Contract Test: Class Registry & Tree Generation
//!
//! This test verifies that registered classes and plain values turn into
//! config trees bound to the live objects they were generated from.
//!
//! Constraints verified:
//! - Inherited fields come before subclass fields
//! - Registering a property twice on one class is an error
//! - Undeclared fields detect their kind from the value
//! - Generated nodes write straight into the source object
//!
//! If this test fails, generated panels show the wrong fields or edit copies.

mod common;

use common::*;
use std::sync::Arc;
use uiconfig_core::node::Child;
use uiconfig_core::registry::{ClassRegistry, FieldDescriptor, FieldParams};
use uiconfig_core::tree::{container_folder, flatten, generate_ui_config};
use uiconfig_core::value::{ObjectValue, Record, Value};
use uiconfig_core::{ChangeProps, ConfigNode, Error};

fn registry() -> Arc<ClassRegistry> {
    let registry = Arc::new(ClassRegistry::new());
    registry.register_class("Person", None).unwrap();
    registry.register_field("Person", FieldDescriptor::input("name", "Name")).unwrap();
    registry
        .register_field("Person", FieldDescriptor::slider("age", "Age", [0.0, 150.0], Some(1.0)))
        .unwrap();

    registry.register_class("Employee", Some("Person")).unwrap();
    registry
        .register_field(
            "Employee",
            FieldDescriptor::dropdown(
                "city",
                "City",
                ["New York", "Paris", "London"]
                    .into_iter()
                    .map(|c| Child::from(ConfigNode::builder("option").label(c).build())),
            ),
        )
        .unwrap();
    registry.register_field("Employee", FieldDescriptor::infer("position")).unwrap();
    registry
}

fn employee() -> Arc<Record> {
    Record::new()
        .with_class("Employee")
        .with_field("name", "John")
        .with_field("age", 30)
        .with_field("city", "Paris")
        .with_field("position", Vec3::new(0.0, 1.0, 0.0))
        .into_shared()
}

#[test]
fn inherited_fields_come_first() {
    let registry = registry();
    let properties: Vec<String> = registry
        .descriptors("Employee")
        .into_iter()
        .map(|d| d.property)
        .collect();
    assert_eq!(properties, vec!["name", "age", "city", "position"]);
    assert_eq!(registry.lineage("Employee"), vec!["Employee", "Person"]);
}

#[test]
fn duplicate_property_is_rejected() {
    let registry = registry();
    let err = registry
        .register_field("Person", FieldDescriptor::number("age", "Years"))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateField { .. }));

    // redeclaring on a subclass is an override, not a duplicate
    registry
        .register_field("Employee", FieldDescriptor::number("age", "Years"))
        .unwrap();
}

#[test]
fn generated_panel_follows_descriptors() {
    let registry = registry();
    let employee: Value = employee().into();
    let panel = container_folder(&registry, "Employee", &employee, &FieldParams::new(), "panel");

    let children = panel.children();
    let kinds: Vec<Option<String>> = children.iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            Some("input".to_string()),
            Some("slider".to_string()),
            Some("dropdown".to_string()),
            Some("vec".to_string()),
        ]
    );
    assert_eq!(children[1].raw_bounds(), Some(vec![0.0, 150.0]));
    assert_eq!(children[2].children().len(), 3);
    assert_eq!(children[3].label().as_deref(), Some("position"));
}

#[test]
fn generated_nodes_edit_the_source_object() {
    let registry = registry();
    let source = employee();
    let panel = container_folder(&registry, "Employee", &source.clone().into(), &FieldParams::new(), "panel");
    let (methods, history) = methods();

    let age = panel.children()[1].clone();
    assert!(methods.write_now(&age, 31, ChangeProps::last(true), false, true));
    assert_eq!(source.get("age"), Some(Value::from(31)));
    assert_eq!(history.undo_count(), 1);
    assert_eq!(methods.bounds(&age, false).step, 1.0);
}

#[test]
fn plain_values_generate_lazy_children() {
    let registry = Arc::new(ClassRegistry::new());
    let settings: Value = Record::new()
        .with_field("enabled", true)
        .with_field("volume", 0.5)
        .with_field("title", "Main")
        .with_field("missing", Value::Null)
        .with_field("tags", Value::array(vec![Value::from("a"), Value::from("b")]))
        .into_shared()
        .into();

    let children = generate_ui_config(&registry, &settings);
    assert_eq!(children.len(), 4);

    let folder = ConfigNode::builder("folder").children(children).build();
    let kinds: Vec<String> = folder
        .children()
        .iter()
        .filter_map(|c| c.kind())
        .collect();
    assert_eq!(kinds, vec!["checkbox", "number", "input", "folder"]);

    // the array folder and its two elements
    assert_eq!(flatten(&folder).len(), 1 + 4 + 2);
}
