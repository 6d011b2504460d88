// # Config Node
//
// Declarative description of one UI-bindable element and, optionally, its
// children.
//
// A node carries three groups of state:
//
// - **Author data** (`NodeProps`): kind, label, children, binding location,
//   value slot, constraints, listeners, dispatch mode and presentation flags.
//   Lazy attributes are `ValueOrThunk`s evaluated at the point of use.
// - **Parent links**: the change notifier and fallback binding injected by
//   whichever component attaches the node as a child. Not owned.
// - **Render state**: the handle, handle kind and refresh function installed
//   by a renderer. Opaque to the binding layer.
//
// Nodes are shared as `NodeRef = Arc<ConfigNode>` and use interior
// mutability, so they can be mutated after they're handed to a renderer.
// No lock is held while a thunk, listener or handler runs: callables are
// cloned out of the lock first.

use crate::binding::Binding;
use crate::methods::ChangeEvent;
use crate::scheduler::DispatchMode;
use crate::traits::RenderHandle;
use crate::value::{Action, ObjectValue, Value};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Shared handle to a configuration node
pub type NodeRef = Arc<ConfigNode>;

/// Stable node identity
pub type NodeId = String;

/// Maximum nesting of lazy children before evaluation gives up
const MAX_CHILD_DEPTH: usize = 32;

/// A literal or a function of the node, evaluated on every use
pub enum ValueOrThunk<T> {
    /// Fixed value
    Value(T),
    /// Computed from the node at evaluation time
    Thunk(Arc<dyn Fn(&ConfigNode) -> T + Send + Sync>),
}

impl<T: Clone> ValueOrThunk<T> {
    /// Wrap a function of the node
    pub fn thunk(f: impl Fn(&ConfigNode) -> T + Send + Sync + 'static) -> Self {
        ValueOrThunk::Thunk(Arc::new(f))
    }

    /// Current value for `node`
    pub fn evaluate(&self, node: &ConfigNode) -> T {
        match self {
            ValueOrThunk::Value(v) => v.clone(),
            ValueOrThunk::Thunk(f) => f(node),
        }
    }
}

impl<T: Clone> Clone for ValueOrThunk<T> {
    fn clone(&self) -> Self {
        match self {
            ValueOrThunk::Value(v) => ValueOrThunk::Value(v.clone()),
            ValueOrThunk::Thunk(f) => ValueOrThunk::Thunk(f.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueOrThunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrThunk::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ValueOrThunk::Thunk(_) => write!(f, "Thunk"),
        }
    }
}

impl<T> From<T> for ValueOrThunk<T> {
    fn from(value: T) -> Self {
        ValueOrThunk::Value(value)
    }
}

/// Source of a node's binding location
pub type BindingSource = ValueOrThunk<Option<Binding>>;

/// Produces the parent's binding location for a child without its own
pub type ParentBinding = Arc<dyn Fn() -> Option<Binding> + Send + Sync>;

/// Receives change events bubbling up from a child
pub type ParentNotifier = Arc<dyn Fn(&ChangeEvent, &[Value]) + Send + Sync>;

/// Listener for a node's change events; the slice holds extra dispatch arguments
pub type ChangeListener = Arc<dyn Fn(&ChangeEvent, &[Value]) + Send + Sync>;

/// Refresh callback installed by a renderer: `(deep, mode, delay)`
pub type RefreshFn = Arc<dyn Fn(bool, Option<DispatchMode>, Duration) + Send + Sync>;

/// Getter half of a node's value accessor pair
pub type ValueGetter = Arc<dyn Fn() -> Value + Send + Sync>;

/// Setter half of a node's value accessor pair; returns whether the value was accepted
pub type ValueSetter = Arc<dyn Fn(Value) -> bool + Send + Sync>;

/// One entry of a node's child list
#[derive(Clone)]
pub enum Child {
    /// A concrete node
    Node(NodeRef),
    /// Produces more children (possibly none) at evaluation time
    Lazy(Arc<dyn Fn() -> Vec<Child> + Send + Sync>),
}

impl Child {
    /// Wrap a child-producing function
    pub fn lazy(f: impl Fn() -> Vec<Child> + Send + Sync + 'static) -> Self {
        Child::Lazy(Arc::new(f))
    }
}

impl From<NodeRef> for Child {
    fn from(node: NodeRef) -> Self {
        Child::Node(node)
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Child::Lazy(_) => write!(f, "Lazy"),
        }
    }
}

/// Evaluate and flatten a child list
pub fn evaluate_children(children: &[Child]) -> Vec<NodeRef> {
    let mut out = Vec::new();
    collect_children(children, 0, &mut out);
    out
}

fn collect_children(children: &[Child], depth: usize, out: &mut Vec<NodeRef>) {
    if depth > MAX_CHILD_DEPTH {
        warn!(depth, "Lazy children nested too deeply, skipping");
        return;
    }
    for child in children {
        match child {
            Child::Node(node) => out.push(node.clone()),
            Child::Lazy(f) => collect_children(&f(), depth + 1, out),
        }
    }
}

/// Change listeners: one, or a list (whose entries may themselves be lists)
#[derive(Clone)]
pub enum Listeners {
    /// A single listener
    One(ChangeListener),
    /// A list of listeners
    Many(Vec<Listeners>),
}

impl Listeners {
    /// Wrap a single listener
    pub fn one(f: impl Fn(&ChangeEvent, &[Value]) + Send + Sync + 'static) -> Self {
        Listeners::One(Arc::new(f))
    }

    /// Build a list
    pub fn many(items: impl IntoIterator<Item = Listeners>) -> Self {
        Listeners::Many(items.into_iter().collect())
    }

    /// Flatten up to two levels of lists
    ///
    /// Deeper nesting is malformed: it is logged and skipped while its
    /// siblings are kept.
    pub fn flatten(&self) -> Vec<ChangeListener> {
        let mut out = Vec::new();
        match self {
            Listeners::One(f) => out.push(f.clone()),
            Listeners::Many(items) => {
                for item in items {
                    match item {
                        Listeners::One(f) => out.push(f.clone()),
                        Listeners::Many(inner) => {
                            for entry in inner {
                                match entry {
                                    Listeners::One(f) => out.push(f.clone()),
                                    Listeners::Many(_) => {
                                        tracing::error!("onChange listeners nested too deeply, skipping entry");
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listeners::One(_) => write!(f, "One"),
            Listeners::Many(items) => f.debug_list().entries(items).finish(),
        }
    }
}

/// A node's own value, used when no binding location is set
///
/// Exposed to the binding layer as an object with a single `value` field.
pub enum ValueSlot {
    /// Value stored on the node
    Literal(RwLock<Value>),
    /// Value read and written through application callbacks
    Accessor {
        /// Reads the value
        get: Option<ValueGetter>,
        /// Writes the value; without it the slot is read-only
        set: Option<ValueSetter>,
    },
}

impl fmt::Debug for ValueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSlot::Literal(v) => f.debug_tuple("Literal").field(&*v.read()).finish(),
            ValueSlot::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

impl ObjectValue for ValueSlot {
    fn get(&self, key: &str) -> Option<Value> {
        if key != "value" {
            return None;
        }
        match self {
            ValueSlot::Literal(v) => Some(v.read().clone()),
            ValueSlot::Accessor { get, .. } => get.clone().map(|g| g()),
        }
    }

    fn set(&self, key: &str, value: Value) -> bool {
        if key != "value" {
            return false;
        }
        match self {
            ValueSlot::Literal(v) => {
                *v.write() = value;
                true
            }
            ValueSlot::Accessor { set, .. } => match set.clone() {
                Some(s) => s(value),
                None => false,
            },
        }
    }

    fn keys(&self) -> Vec<String> {
        vec!["value".to_string()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Author-controlled attributes of a node
#[derive(Default)]
pub struct NodeProps {
    /// UI kind tag
    pub kind: Option<String>,
    /// Display label
    pub label: Option<ValueOrThunk<String>>,
    /// Ordered children
    pub children: Vec<Child>,
    /// Binding location
    pub binding: Option<BindingSource>,
    /// Dot path appended to a named binding key
    pub path: Option<ValueOrThunk<String>>,
    /// Numeric bounds `[min, max]`
    pub bounds: Option<ValueOrThunk<Vec<f64>>>,
    /// Step size for numeric inputs
    pub step_size: Option<ValueOrThunk<f64>>,
    /// Change listeners
    pub on_change: Option<Listeners>,
    /// Click handler
    pub on_click: Option<Action>,
    /// Phase at which deferred operations on this node run
    pub dispatch_mode: Option<DispatchMode>,
    /// Whether click arguments are forwarded to actions
    pub send_args: Option<ValueOrThunk<bool>>,
    pub hidden: Option<ValueOrThunk<bool>>,
    pub disabled: Option<ValueOrThunk<bool>>,
    pub read_only: Option<ValueOrThunk<bool>>,
    pub expanded: Option<ValueOrThunk<bool>>,
    /// Free-form tags for consumer components
    pub tags: Vec<String>,
    /// Sort hint for consumer components
    pub order: Option<ValueOrThunk<f64>>,
    /// Free-form options for consumer components
    pub extra: HashMap<String, Value>,
}

#[derive(Default)]
struct ParentLinks {
    notifier: Option<ParentNotifier>,
    binding: Option<ParentBinding>,
}

#[derive(Default)]
struct RenderState {
    handle: Option<Box<dyn RenderHandle>>,
    handle_kind: Option<String>,
    refresh: Option<RefreshFn>,
}

/// A configuration node
pub struct ConfigNode {
    id: OnceLock<NodeId>,
    props: RwLock<NodeProps>,
    value_slot: Option<Arc<ValueSlot>>,
    parent: RwLock<ParentLinks>,
    render: RwLock<RenderState>,
}

impl ConfigNode {
    /// Start building a node of the given kind
    pub fn builder(kind: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new().kind(kind)
    }

    /// Create a node from props, without a value slot
    pub fn from_props(props: NodeProps) -> NodeRef {
        Arc::new(Self {
            id: OnceLock::new(),
            props: RwLock::new(props),
            value_slot: None,
            parent: RwLock::new(ParentLinks::default()),
            render: RwLock::new(RenderState::default()),
        })
    }

    /// Node identity, generated on first use
    pub fn id(&self) -> &str {
        self.id.get_or_init(|| uuid::Uuid::new_v4().to_string())
    }

    /// Whether the identity has been assigned yet
    pub fn has_id(&self) -> bool {
        self.id.get().is_some()
    }

    /// Read access to the author attributes
    ///
    /// Don't call back into the node while holding the guard.
    pub fn props(&self) -> RwLockReadGuard<'_, NodeProps> {
        self.props.read()
    }

    /// Write access to the author attributes
    pub fn props_mut(&self) -> RwLockWriteGuard<'_, NodeProps> {
        self.props.write()
    }

    /// Kind tag, if set
    pub fn kind(&self) -> Option<String> {
        self.props.read().kind.clone()
    }

    /// Set the kind tag
    pub fn set_kind(&self, kind: impl Into<String>) {
        self.props.write().kind = Some(kind.into());
    }

    /// Evaluated label, if set
    pub fn label(&self) -> Option<String> {
        let label = self.props.read().label.clone();
        label.map(|l| l.evaluate(self))
    }

    /// Evaluated, flattened children
    pub fn children(&self) -> Vec<NodeRef> {
        let children = self.props.read().children.clone();
        evaluate_children(&children)
    }

    /// Append a child entry
    pub fn push_child(&self, child: impl Into<Child>) {
        self.props.write().children.push(child.into());
    }

    /// Remove a direct child node; returns whether it was found
    pub fn remove_child(&self, node: &NodeRef) -> bool {
        let mut props = self.props.write();
        let before = props.children.len();
        props
            .children
            .retain(|c| !matches!(c, Child::Node(n) if Arc::ptr_eq(n, node)));
        props.children.len() != before
    }

    /// Evaluated binding location, if set
    pub fn binding(&self) -> Option<Binding> {
        let binding = self.props.read().binding.clone();
        binding.and_then(|b| b.evaluate(self))
    }

    /// Whether a binding location (literal or thunk) is set
    pub fn has_binding(&self) -> bool {
        self.props.read().binding.is_some()
    }

    /// Evaluated dot path, if set
    pub fn path(&self) -> Option<String> {
        let path = self.props.read().path.clone();
        path.map(|p| p.evaluate(self))
    }

    /// Evaluated bounds, if set
    pub fn raw_bounds(&self) -> Option<Vec<f64>> {
        let bounds = self.props.read().bounds.clone();
        bounds.map(|b| b.evaluate(self))
    }

    /// Evaluated step size, if set
    pub fn step_size(&self) -> Option<f64> {
        let step = self.props.read().step_size.clone();
        step.map(|s| s.evaluate(self))
    }

    /// The node's own value slot
    pub fn value_slot(&self) -> Option<Arc<ValueSlot>> {
        self.value_slot.clone()
    }

    /// Change listeners
    pub fn listeners(&self) -> Option<Listeners> {
        self.props.read().on_change.clone()
    }

    /// Click handler
    pub fn on_click(&self) -> Option<Action> {
        self.props.read().on_click.clone()
    }

    /// Dispatch mode, if set
    pub fn dispatch_mode(&self) -> Option<DispatchMode> {
        self.props.read().dispatch_mode
    }

    /// Whether click arguments are forwarded; `None` when unset
    pub fn send_args(&self) -> Option<bool> {
        self.flag(|p| p.send_args.clone())
    }

    /// Evaluate one of the boolean presentation flags
    pub fn flag(&self, select: impl FnOnce(&NodeProps) -> Option<ValueOrThunk<bool>>) -> Option<bool> {
        let flag = select(&self.props.read());
        flag.map(|f| f.evaluate(self))
    }

    /// Evaluated sort hint
    pub fn order(&self) -> Option<f64> {
        let order = self.props.read().order.clone();
        order.map(|o| o.evaluate(self))
    }

    /// Tags
    pub fn tags(&self) -> Vec<String> {
        self.props.read().tags.clone()
    }

    /// Free-form option by name
    pub fn extra(&self, key: &str) -> Option<Value> {
        self.props.read().extra.get(key).cloned()
    }

    /// Parent change notifier
    pub fn parent_notifier(&self) -> Option<ParentNotifier> {
        self.parent.read().notifier.clone()
    }

    /// Install the parent change notifier
    pub fn set_parent_notifier(&self, notifier: Option<ParentNotifier>) {
        self.parent.write().notifier = notifier;
    }

    /// Parent binding location, evaluated
    pub fn parent_binding(&self) -> Option<Binding> {
        let binding = self.parent.read().binding.clone();
        binding.and_then(|b| b())
    }

    /// Whether a parent binding fallback is installed
    pub fn has_parent_binding(&self) -> bool {
        self.parent.read().binding.is_some()
    }

    /// Install the parent binding fallback
    pub fn set_parent_binding(&self, binding: Option<ParentBinding>) {
        self.parent.write().binding = binding;
    }

    /// Store a render handle and the kind it was rendered as
    pub fn set_render_handle(&self, handle: Box<dyn RenderHandle>, kind: Option<String>) {
        let mut render = self.render.write();
        render.handle = Some(handle);
        render.handle_kind = kind;
    }

    /// Take the render handle out of the node
    pub fn take_render_handle(&self) -> Option<Box<dyn RenderHandle>> {
        self.render.write().handle.take()
    }

    /// Kind the node was last rendered as
    pub fn render_handle_kind(&self) -> Option<String> {
        self.render.read().handle_kind.clone()
    }

    /// Whether a renderer currently holds a handle for this node
    pub fn is_rendered(&self) -> bool {
        self.render.read().handle.is_some()
    }

    /// Installed refresh function
    pub fn refresh_fn(&self) -> Option<RefreshFn> {
        self.render.read().refresh.clone()
    }

    /// Install or clear the refresh function
    pub fn set_refresh_fn(&self, refresh: Option<RefreshFn>) {
        self.render.write().refresh = refresh;
    }

    /// Clear the handle kind and refresh function, returning the handle
    pub fn clear_render_state(&self) -> Option<Box<dyn RenderHandle>> {
        let mut render = self.render.write();
        render.handle_kind = None;
        render.refresh = None;
        render.handle.take()
    }

    /// Ask the installed renderer to refresh this node; no-op when unrendered
    pub fn request_refresh(&self, deep: bool, mode: Option<DispatchMode>, delay: Duration) {
        if let Some(refresh) = self.refresh_fn() {
            refresh(deep, mode, delay);
        }
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("id", &self.id.get())
            .field("kind", &self.props.read().kind)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConfigNode`]
///
/// # Example
///
/// ```rust
/// use uiconfig_core::node::ConfigNode;
/// use uiconfig_core::value::Record;
///
/// let person = Record::new().with_field("age", 30).into_shared();
/// let node = ConfigNode::builder("number")
///     .label("Age")
///     .bind(person, "age")
///     .bounds(vec![0.0, 150.0])
///     .build();
///
/// assert_eq!(node.label().as_deref(), Some("Age"));
/// ```
#[derive(Default)]
pub struct NodeBuilder {
    id: Option<NodeId>,
    props: NodeProps,
    value: Option<Value>,
    getter: Option<ValueGetter>,
    setter: Option<ValueSetter>,
}

impl NodeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Author-supplied identity
    pub fn id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.props.kind = Some(kind.into());
        self
    }

    /// Clear the kind (the node will be defaulted on init)
    pub fn no_kind(mut self) -> Self {
        self.props.kind = None;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.props.label = Some(ValueOrThunk::Value(label.into()));
        self
    }

    pub fn label_fn(mut self, f: impl Fn(&ConfigNode) -> String + Send + Sync + 'static) -> Self {
        self.props.label = Some(ValueOrThunk::thunk(f));
        self
    }

    /// Bind to `key` of `target`
    pub fn bind(mut self, target: impl Into<crate::binding::Target>, key: impl Into<crate::value::Key>) -> Self {
        self.props.binding = Some(ValueOrThunk::Value(Some(Binding::new(target, key))));
        self
    }

    /// Bind to a fixed location
    pub fn binding(mut self, binding: Binding) -> Self {
        self.props.binding = Some(ValueOrThunk::Value(Some(binding)));
        self
    }

    /// Bind through a function evaluated on every access
    pub fn binding_fn(mut self, f: impl Fn(&ConfigNode) -> Option<Binding> + Send + Sync + 'static) -> Self {
        self.props.binding = Some(ValueOrThunk::thunk(f));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.props.path = Some(ValueOrThunk::Value(path.into()));
        self
    }

    pub fn path_fn(mut self, f: impl Fn(&ConfigNode) -> String + Send + Sync + 'static) -> Self {
        self.props.path = Some(ValueOrThunk::thunk(f));
        self
    }

    /// Literal value held by the node itself
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Value getter
    pub fn getter(mut self, get: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.getter = Some(Arc::new(get));
        self
    }

    /// Value setter
    pub fn setter(mut self, set: impl Fn(Value) -> bool + Send + Sync + 'static) -> Self {
        self.setter = Some(Arc::new(set));
        self
    }

    pub fn bounds(mut self, bounds: Vec<f64>) -> Self {
        self.props.bounds = Some(ValueOrThunk::Value(bounds));
        self
    }

    pub fn bounds_fn(mut self, f: impl Fn(&ConfigNode) -> Vec<f64> + Send + Sync + 'static) -> Self {
        self.props.bounds = Some(ValueOrThunk::thunk(f));
        self
    }

    pub fn step_size(mut self, step: f64) -> Self {
        self.props.step_size = Some(ValueOrThunk::Value(step));
        self
    }

    /// Add a change listener; repeated calls accumulate
    pub fn on_change(mut self, f: impl Fn(&ChangeEvent, &[Value]) + Send + Sync + 'static) -> Self {
        let listener = Listeners::one(f);
        self.props.on_change = Some(match self.props.on_change.take() {
            None => listener,
            Some(Listeners::Many(mut items)) => {
                items.push(listener);
                Listeners::Many(items)
            }
            Some(existing) => Listeners::Many(vec![existing, listener]),
        });
        self
    }

    /// Replace the listener set
    pub fn listeners(mut self, listeners: Listeners) -> Self {
        self.props.on_change = Some(listeners);
        self
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.props.on_click = Some(action);
        self
    }

    pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.props.dispatch_mode = Some(mode);
        self
    }

    pub fn send_args(mut self, send: bool) -> Self {
        self.props.send_args = Some(ValueOrThunk::Value(send));
        self
    }

    pub fn hidden(mut self, hidden: impl Into<ValueOrThunk<bool>>) -> Self {
        self.props.hidden = Some(hidden.into());
        self
    }

    pub fn disabled(mut self, disabled: impl Into<ValueOrThunk<bool>>) -> Self {
        self.props.disabled = Some(disabled.into());
        self
    }

    pub fn read_only(mut self, read_only: impl Into<ValueOrThunk<bool>>) -> Self {
        self.props.read_only = Some(read_only.into());
        self
    }

    pub fn expanded(mut self, expanded: impl Into<ValueOrThunk<bool>>) -> Self {
        self.props.expanded = Some(expanded.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.props.tags.push(tag.into());
        self
    }

    pub fn order(mut self, order: f64) -> Self {
        self.props.order = Some(ValueOrThunk::Value(order));
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.extra.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.props.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Child>) -> Self {
        self.props.children.extend(children);
        self
    }

    /// Add a lazily evaluated group of children
    pub fn lazy_children(mut self, f: impl Fn() -> Vec<Child> + Send + Sync + 'static) -> Self {
        self.props.children.push(Child::lazy(f));
        self
    }

    /// Finish the node
    pub fn build(self) -> NodeRef {
        let value_slot = match (self.value, self.getter, self.setter) {
            (Some(value), getter, setter) => {
                if getter.is_some() || setter.is_some() {
                    warn!("Node has both a value and accessors; ignoring the accessors");
                }
                Some(Arc::new(ValueSlot::Literal(RwLock::new(value))))
            }
            (None, None, None) => None,
            (None, get, set) => Some(Arc::new(ValueSlot::Accessor { get, set })),
        };

        let id = OnceLock::new();
        if let Some(explicit) = self.id {
            let _ = id.set(explicit);
        }

        Arc::new(ConfigNode {
            id,
            props: RwLock::new(self.props),
            value_slot,
            parent: RwLock::new(ParentLinks::default()),
            render: RwLock::new(RenderState::default()),
        })
    }
}
