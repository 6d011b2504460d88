//! Config tree generation
//!
//! Turns live application values into config nodes: registered class
//! fields first (parent class first), and for plain objects and arrays one
//! lazily generated child per entry, with the UI kind detected from the
//! value's shape.

use crate::binding::Target;
use crate::node::{Child, ConfigNode, NodeRef};
use crate::registry::{ClassRegistry, FieldParams};
use crate::value::{Key, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Detect a UI kind from a value's shape
///
/// Arrays and plain objects are folders; objects with a numeric `x` are
/// vectors, with a numeric `r` colors, and textures images. Null has no kind.
pub fn value_to_kind(value: &Value) -> Option<&'static str> {
    match value {
        Value::Null => None,
        Value::Array(_) => Some("folder"),
        Value::Bool(_) => Some("checkbox"),
        Value::Number(_) => Some("number"),
        Value::String(_) => Some("input"),
        Value::Function(_) => Some("button"),
        Value::Object(object) => {
            if matches!(object.get("x"), Some(Value::Number(_))) {
                Some("vec")
            } else if matches!(object.get("r"), Some(Value::Number(_))) {
                Some("color")
            } else if object.is_texture() {
                Some("image")
            } else {
                Some("folder")
            }
        }
    }
}

/// Generate the child entries describing `target`
///
/// For an object whose class is registered, one entry per registered field
/// (ancestors' fields first). For a plain object or an array, one lazy entry
/// per non-null field or element.
pub fn generate_ui_config(registry: &Arc<ClassRegistry>, target: &Value) -> Vec<Child> {
    let Some(container) = Target::from_value(target) else {
        return Vec::new();
    };

    let class = target
        .as_object()
        .and_then(|o| o.class_name().map(str::to_string))
        .filter(|c| registry.has_class(c));

    let mut result = Vec::new();
    match &class {
        None => {
            for key in entry_keys(&container) {
                if container.get(&key).is_none_or(|v| v.is_null()) {
                    continue;
                }
                let (registry, container) = (registry.clone(), container.clone());
                result.push(Child::lazy(move || {
                    let label = key.to_string();
                    generate_value_config(&registry, &container, &key, Some(&label))
                        .map(Child::Node)
                        .into_iter()
                        .collect()
                }));
            }
        }
        Some(class) => {
            for descriptor in registry.descriptors(class) {
                let key = Key::name(descriptor.property.clone());
                match descriptor.kind {
                    None => {
                        let (registry, container, target) =
                            (registry.clone(), container.clone(), target.clone());
                        let params = descriptor.params;
                        result.push(Child::lazy(move || {
                            generate_value_config(&registry, &container, &key, None)
                                .map(|node| {
                                    params.apply(&node, Some(&target));
                                    Child::Node(node)
                                })
                                .into_iter()
                                .collect()
                        }));
                    }
                    Some(kind) => {
                        let node = ConfigNode::builder(kind)
                            .bind(container.clone(), key)
                            .build();
                        descriptor.params.apply(&node, Some(target));
                        result.push(Child::Node(node));
                    }
                }
            }
        }
    }
    result
}

fn entry_keys(container: &Target) -> Vec<Key> {
    match container {
        Target::Object(o) => o.keys().into_iter().map(Key::Name).collect(),
        Target::Array(a) => (0..a.len()).map(Key::Index).collect(),
    }
}

/// Generate the node for one field of a container
///
/// An object that provides its own node ([`ObjectValue::ui_config`]) uses
/// it. Otherwise the kind is detected from the value: containers become
/// lazily populated folders, everything else a node bound to `(target, key)`.
/// Nodes without a label get `label`, or the key.
///
/// [`ObjectValue::ui_config`]: crate::value::ObjectValue::ui_config
pub fn generate_value_config(
    registry: &Arc<ClassRegistry>,
    target: &Target,
    key: &Key,
    label: Option<&str>,
) -> Option<NodeRef> {
    let value = target.get(key)?;

    let own = value.as_object().and_then(|o| o.ui_config());
    let node = match own {
        Some(node) => node,
        None => {
            let kind = value_to_kind(&value)?;
            if kind == "folder" {
                generate_ui_folder(registry, &key.to_string(), &value, &FieldParams::new(), "folder", true)
            } else {
                ConfigNode::builder(kind)
                    .label(key.to_string())
                    .bind(target.clone(), key.clone())
                    .build()
            }
        }
    };

    if node.props().label.is_none() {
        let label = label.map(str::to_string).unwrap_or_else(|| key.to_string());
        node.props_mut().label = Some(label.into());
    }
    Some(node)
}

/// Generate a folder node for `target`
///
/// # Parameters
///
/// - `label`: Folder label
/// - `target`: Object or array the children are generated from
/// - `params`: Extra attributes applied to the folder
/// - `kind`: Folder kind, usually `"folder"` or `"panel"`
/// - `dynamic`: Regenerate the children on every evaluation instead of once
pub fn generate_ui_folder(
    registry: &Arc<ClassRegistry>,
    label: &str,
    target: &Value,
    params: &FieldParams,
    kind: &str,
    dynamic: bool,
) -> NodeRef {
    let builder = ConfigNode::builder(kind).label(label);
    let builder = if dynamic {
        let (registry, target) = (registry.clone(), target.clone());
        builder.lazy_children(move || generate_ui_config(&registry, &target))
    } else {
        builder.children(generate_ui_config(registry, target))
    };
    let node = builder.build();
    node.id();
    params.apply(&node, Some(target));
    node
}

/// Container node for a whole object, like a class-level panel
pub fn container_folder(
    registry: &Arc<ClassRegistry>,
    label: &str,
    target: &Value,
    params: &FieldParams,
    kind: &str,
) -> NodeRef {
    generate_ui_folder(registry, label, target, params, kind, false)
}

/// A node and all its evaluated descendants, depth-first
pub fn flatten(node: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect(node, &mut seen, &mut out, |_| true);
    out
}

/// Like [`flatten`], but only through nodes accepted by `include`
///
/// A rejected node is skipped together with its subtree.
pub fn flatten_where(node: &NodeRef, include: impl Fn(&ConfigNode) -> bool + Copy) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect(node, &mut seen, &mut out, include);
    out
}

fn collect(
    node: &NodeRef,
    seen: &mut HashSet<*const ConfigNode>,
    out: &mut Vec<NodeRef>,
    include: impl Fn(&ConfigNode) -> bool + Copy,
) {
    if !include(node.as_ref()) || !seen.insert(Arc::as_ptr(node)) {
        return;
    }
    out.push(node.clone());
    for child in node.children() {
        collect(&child, seen, out, include);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldDescriptor;
    use crate::value::{Action, ArrayRef, Record};

    fn registry() -> Arc<ClassRegistry> {
        Arc::new(ClassRegistry::new())
    }

    #[test]
    fn test_value_to_kind() {
        let vec3: Value = Record::new().with_field("x", 1).into_shared().into();
        let color: Value = Record::new().with_field("r", 0.5).into_shared().into();
        let plain: Value = Record::new().with_field("x", "nope").into_shared().into();

        assert_eq!(value_to_kind(&Value::Null), None);
        assert_eq!(value_to_kind(&Value::from(true)), Some("checkbox"));
        assert_eq!(value_to_kind(&Value::from(1)), Some("number"));
        assert_eq!(value_to_kind(&Value::from("s")), Some("input"));
        assert_eq!(value_to_kind(&Value::array(vec![])), Some("folder"));
        assert_eq!(value_to_kind(&Value::from(Action::unit(|| {}))), Some("button"));
        assert_eq!(value_to_kind(&vec3), Some("vec"));
        assert_eq!(value_to_kind(&color), Some("color"));
        assert_eq!(value_to_kind(&plain), Some("folder"));
    }

    #[test]
    fn test_plain_object_children_skip_null() {
        let person: Value = Record::new()
            .with_field("name", "John")
            .with_field("age", 30)
            .with_field("nickname", Value::Null)
            .into_shared()
            .into();
        let folder = generate_ui_folder(&registry(), "Person", &person, &FieldParams::new(), "folder", false);
        let children = folder.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind().as_deref(), Some("input"));
        assert_eq!(children[0].label().as_deref(), Some("name"));
        assert_eq!(children[1].kind().as_deref(), Some("number"));
    }

    #[test]
    fn test_array_children_bind_by_index() {
        let list = ArrayRef::new(vec![Value::from(1), Value::from(2)]);
        let holder = Arc::new(Record::new().with_field("list", list.clone()));
        let node = generate_value_config(&registry(), &Target::from(holder), &Key::name("list"), None).unwrap();
        assert_eq!(node.kind().as_deref(), Some("folder"));

        let items = node.children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].binding().unwrap().key, Key::Index(1));
        assert_eq!(items[1].label().as_deref(), Some("1"));
    }

    #[test]
    fn test_registered_class_uses_descriptors() {
        let registry = registry();
        registry.register_class("Person", None).unwrap();
        registry.register_field("Person", FieldDescriptor::input("name", "Name")).unwrap();
        registry.register_field("Person", FieldDescriptor::infer("age")).unwrap();

        let person: Value = Record::new()
            .with_class("Person")
            .with_field("name", "John")
            .with_field("age", 30)
            .with_field("secret", "hidden")
            .into_shared()
            .into();

        let folder = container_folder(&registry, "Person", &person, &FieldParams::new(), "panel");
        assert_eq!(folder.kind().as_deref(), Some("panel"));
        let children = folder.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].label().as_deref(), Some("Name"));
        assert_eq!(children[1].kind().as_deref(), Some("number"));
        assert_eq!(children[1].label().as_deref(), Some("age"));
    }

    #[test]
    fn test_flatten_depth_first() {
        let leaf = ConfigNode::builder("input").build();
        let inner = ConfigNode::builder("folder").child(leaf.clone()).build();
        let other = ConfigNode::builder("input").build();
        let root = ConfigNode::builder("panel").child(inner.clone()).child(other.clone()).build();

        let all = flatten(&root);
        assert_eq!(all.len(), 4);
        assert!(Arc::ptr_eq(&all[1], &inner));
        assert!(Arc::ptr_eq(&all[2], &leaf));
        assert!(Arc::ptr_eq(&all[3], &other));

        let without_inner = flatten_where(&root, |n| n.kind().as_deref() != Some("folder"));
        assert_eq!(without_inner.len(), 2);
    }
}
