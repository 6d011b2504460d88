//! Per-class field registry
//!
//! The registry maps a class name to the ordered list of fields that class
//! exposes in the UI. Tree generation walks it parent-class-first, so
//! inherited fields render before the ones a subclass adds.
//!
//! ## Usage
//!
//! ```rust
//! use uiconfig_core::registry::{ClassRegistry, FieldDescriptor};
//!
//! let registry = ClassRegistry::new();
//! registry.register_class("Person", None)?;
//! registry.register_field("Person", FieldDescriptor::input("name", "Name"))?;
//! registry.register_field("Person", FieldDescriptor::slider("age", "Age", [0.0, 150.0], None))?;
//!
//! // registering the same property twice is a programming error
//! assert!(registry.register_field("Person", FieldDescriptor::number("age", "Age")).is_err());
//! # Ok::<(), uiconfig_core::Error>(())
//! ```
//!
//! ## Lifecycle
//!
//! Populate the registry once at startup (where a class's fields are
//! declared), then share it via `Arc` with whatever generates trees.

use crate::error::{Error, Result};
use crate::node::{Child, ConfigNode, ValueOrThunk};
use crate::scheduler::DispatchMode;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Params computed from the target object at generation time
pub type DynamicParams = Arc<dyn Fn(&Value) -> FieldParams + Send + Sync>;

/// Attributes applied to a generated node
///
/// Unset fields leave the node untouched.
#[derive(Clone, Default)]
pub struct FieldParams {
    pub label: Option<String>,
    pub bounds: Option<Vec<f64>>,
    pub step_size: Option<f64>,
    /// Child entries (dropdown options, extra buttons)
    pub children: Vec<Child>,
    pub dispatch_mode: Option<DispatchMode>,
    pub hidden: Option<bool>,
    pub disabled: Option<bool>,
    pub read_only: Option<bool>,
    pub expanded: Option<bool>,
    pub tags: Vec<String>,
    pub order: Option<f64>,
    pub extra: HashMap<String, Value>,
    /// Further params derived from the target object
    pub dynamic: Option<DynamicParams>,
}

impl FieldParams {
    /// Empty params
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<f64>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_step_size(mut self, step: f64) -> Self {
        self.step_size = Some(step);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Child>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = Some(mode);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Compute more params from the target object when the node is generated
    pub fn with_dynamic(mut self, f: impl Fn(&Value) -> FieldParams + Send + Sync + 'static) -> Self {
        self.dynamic = Some(Arc::new(f));
        self
    }

    /// Layer `other` on top of these params
    fn merge(&mut self, other: FieldParams) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(label, bounds, step_size, dispatch_mode, hidden, disabled, read_only, expanded, order);
        if !other.children.is_empty() {
            self.children = other.children;
        }
        self.tags.extend(other.tags);
        self.extra.extend(other.extra);
    }

    /// Assign the params (static, then dynamic for `target`) onto a node
    pub fn apply(&self, node: &ConfigNode, target: Option<&Value>) {
        let mut params = self.clone();
        if let (Some(dynamic), Some(target)) = (&self.dynamic, target) {
            params.merge(dynamic(target));
        }

        let mut props = node.props_mut();
        if let Some(label) = params.label {
            props.label = Some(ValueOrThunk::Value(label));
        }
        if let Some(bounds) = params.bounds {
            props.bounds = Some(ValueOrThunk::Value(bounds));
        }
        if let Some(step) = params.step_size {
            props.step_size = Some(ValueOrThunk::Value(step));
        }
        if !params.children.is_empty() {
            props.children = params.children;
        }
        if let Some(mode) = params.dispatch_mode {
            props.dispatch_mode = Some(mode);
        }
        if let Some(hidden) = params.hidden {
            props.hidden = Some(ValueOrThunk::Value(hidden));
        }
        if let Some(disabled) = params.disabled {
            props.disabled = Some(ValueOrThunk::Value(disabled));
        }
        if let Some(read_only) = params.read_only {
            props.read_only = Some(ValueOrThunk::Value(read_only));
        }
        if let Some(expanded) = params.expanded {
            props.expanded = Some(ValueOrThunk::Value(expanded));
        }
        if let Some(order) = params.order {
            props.order = Some(ValueOrThunk::Value(order));
        }
        for tag in params.tags {
            if !props.tags.contains(&tag) {
                props.tags.push(tag);
            }
        }
        props.extra.extend(params.extra);
    }
}

impl fmt::Debug for FieldParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldParams")
            .field("label", &self.label)
            .field("bounds", &self.bounds)
            .field("step_size", &self.step_size)
            .field("children", &self.children.len())
            .field("dynamic", &self.dynamic.is_some())
            .finish_non_exhaustive()
    }
}

/// One field a class exposes
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Property key on the object
    pub property: String,
    /// UI kind; `None` detects it from the value at generation time
    pub kind: Option<String>,
    /// Attributes applied to the generated node
    pub params: FieldParams,
}

impl FieldDescriptor {
    /// Create a descriptor
    pub fn new(property: impl Into<String>, kind: Option<&str>, params: FieldParams) -> Self {
        Self {
            property: property.into(),
            kind: kind.map(str::to_string),
            params,
        }
    }

    fn labelled(property: impl Into<String>, kind: &str, label: impl Into<String>) -> Self {
        Self::new(property, Some(kind), FieldParams::new().with_label(label))
    }

    /// Kind detected from the value
    pub fn infer(property: impl Into<String>) -> Self {
        Self::new(property, None, FieldParams::new())
    }

    pub fn input(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "input", label)
    }

    pub fn number(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "number", label)
    }

    pub fn slider(
        property: impl Into<String>,
        label: impl Into<String>,
        bounds: [f64; 2],
        step_size: Option<f64>,
    ) -> Self {
        let mut descriptor = Self::labelled(property, "slider", label);
        descriptor.params.bounds = Some(bounds.to_vec());
        descriptor.params.step_size = step_size;
        descriptor
    }

    pub fn vector(
        property: impl Into<String>,
        label: impl Into<String>,
        bounds: Option<[f64; 2]>,
        step_size: Option<f64>,
    ) -> Self {
        let mut descriptor = Self::labelled(property, "vec", label);
        descriptor.params.bounds = bounds.map(|b| b.to_vec());
        descriptor.params.step_size = step_size;
        descriptor
    }

    pub fn color(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "color", label)
    }

    pub fn image(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "image", label)
    }

    /// Boolean checkbox
    pub fn toggle(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "checkbox", label)
    }

    /// Dropdown whose children are the options
    pub fn dropdown(
        property: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = Child>,
    ) -> Self {
        let mut descriptor = Self::labelled(property, "dropdown", label);
        descriptor.params.children = options.into_iter().collect();
        descriptor
    }

    pub fn button(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "button", label)
    }

    /// Read-only display of a value
    pub fn monitor(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self::labelled(property, "monitor", label)
    }

    /// Replace the params
    pub fn with_params(mut self, params: FieldParams) -> Self {
        let label = self.params.label.take();
        self.params = params;
        if self.params.label.is_none() {
            self.params.label = label;
        }
        self
    }
}

#[derive(Default)]
struct ClassEntry {
    parent: Option<String>,
    fields: Vec<FieldDescriptor>,
}

/// Registry of class field descriptors
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, ClassEntry>>,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class and its parent class
    ///
    /// Declaring a class again updates its parent and keeps its fields.
    ///
    /// # Parameters
    ///
    /// - `class`: Class name, as reported by `ObjectValue::class_name`
    /// - `parent`: Parent class whose fields are generated first
    ///
    /// # Returns
    ///
    /// - `Err(Error::Registry)`: If the parent chain would loop back to `class`
    pub fn register_class(&self, class: impl Into<String>, parent: Option<&str>) -> Result<()> {
        let class = class.into();
        let mut classes = self.classes.write();

        if let Some(parent) = parent {
            let mut cursor = Some(parent.to_string());
            while let Some(current) = cursor {
                if current == class {
                    return Err(Error::registry(format!(
                        "Class {class} cannot inherit from {parent}: inheritance cycle"
                    )));
                }
                cursor = classes.get(&current).and_then(|e| e.parent.clone());
            }
        }

        classes.entry(class).or_default().parent = parent.map(str::to_string);
        Ok(())
    }

    /// Register a field on a class
    ///
    /// The class is declared (without a parent) if it isn't yet.
    ///
    /// # Returns
    ///
    /// - `Err(Error::DuplicateField)`: If the class already has a descriptor
    ///   for this property
    pub fn register_field(&self, class: &str, descriptor: FieldDescriptor) -> Result<()> {
        let mut classes = self.classes.write();
        let entry = classes.entry(class.to_string()).or_default();
        if entry.fields.iter().any(|f| f.property == descriptor.property) {
            return Err(Error::duplicate_field(class, descriptor.property));
        }
        debug!(class, property = %descriptor.property, kind = ?descriptor.kind, "Registered field");
        entry.fields.push(descriptor);
        Ok(())
    }

    /// Whether a class has been declared
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.read().contains_key(class)
    }

    /// The class followed by its ancestors, root last
    pub fn lineage(&self, class: &str) -> Vec<String> {
        let classes = self.classes.read();
        let mut lineage = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(class.to_string());
        while let Some(current) = cursor {
            if !seen.insert(current.clone()) {
                break;
            }
            cursor = classes.get(&current).and_then(|e| e.parent.clone());
            lineage.push(current);
        }
        lineage
    }

    /// Descriptors of a class and its ancestors, parent-first
    pub fn descriptors(&self, class: &str) -> Vec<FieldDescriptor> {
        let lineage = self.lineage(class);
        let classes = self.classes.read();
        lineage
            .iter()
            .rev()
            .filter_map(|c| classes.get(c))
            .flat_map(|entry| entry.fields.iter().cloned())
            .collect()
    }

    /// List all declared classes
    pub fn list_classes(&self) -> Vec<String> {
        self.classes.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_is_error() {
        let registry = ClassRegistry::new();
        registry.register_field("Person", FieldDescriptor::input("name", "Name")).unwrap();
        let err = registry
            .register_field("Person", FieldDescriptor::infer("name"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateField { ref class, ref property } if class == "Person" && property == "name"));
    }

    #[test]
    fn test_descriptors_parent_first() {
        let registry = ClassRegistry::new();
        registry.register_class("Base", None).unwrap();
        registry.register_class("Derived", Some("Base")).unwrap();
        registry.register_field("Derived", FieldDescriptor::number("b", "B")).unwrap();
        registry.register_field("Base", FieldDescriptor::number("a", "A")).unwrap();

        let props: Vec<_> = registry
            .descriptors("Derived")
            .into_iter()
            .map(|d| d.property)
            .collect();
        assert_eq!(props, vec!["a", "b"]);
        assert_eq!(registry.lineage("Derived"), vec!["Derived", "Base"]);
    }

    #[test]
    fn test_same_property_allowed_on_subclass() {
        let registry = ClassRegistry::new();
        registry.register_class("Derived", Some("Base")).unwrap();
        registry.register_field("Base", FieldDescriptor::number("a", "A")).unwrap();
        assert!(registry.register_field("Derived", FieldDescriptor::slider("a", "A", [0.0, 1.0], None)).is_ok());
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let registry = ClassRegistry::new();
        registry.register_class("A", Some("B")).unwrap();
        assert!(registry.register_class("B", Some("A")).is_err());
        assert!(registry.register_class("C", Some("C")).is_err());
    }

    #[test]
    fn test_params_apply_dynamic_on_top() {
        let params = FieldParams::new()
            .with_label("Static")
            .with_bounds(vec![0.0, 10.0])
            .with_dynamic(|target| {
                let max = target.as_f64().unwrap_or(1.0);
                FieldParams::new().with_bounds(vec![0.0, max])
            });
        let node = ConfigNode::builder("slider").build();
        params.apply(&node, Some(&Value::from(42)));
        assert_eq!(node.label().as_deref(), Some("Static"));
        assert_eq!(node.raw_bounds(), Some(vec![0.0, 42.0]));
    }
}
