// # Config Methods
//
// The value pipeline: every read, write, click and change dispatch between a
// renderer and application state goes through `ConfigMethods`.
//
// ## Write flow
//
// 1. The write is deferred to the node's dispatch phase (`run_at_event`).
// 2. The binding is resolved and the current raw value read.
// 3. Equal values are only accepted when the write is final. Changed values
//    are copied in place when the shapes allow it, otherwise set on the
//    container and read back.
// 4. Accepted writes are offered to the undo coalescer.
// 5. A change event is dispatched synchronously to the node's listeners and
//    bubbles to its parent.
//
// ## Undo coalescing
//
// Non-final writes to the same node within the coalescing window collapse
// into one history entry that keeps the value from before the first write.
// A final write seals the entry.

mod events;

pub use events::{ChangeEvent, ChangeProps};

use crate::binding::{resolve, Binding, Target};
use crate::config::UiConfigSettings;
use crate::node::{ConfigNode, NodeRef, ValueSlot};
use crate::scheduler::{Deferred, DispatchMode, FrameScheduler};
use crate::traits::UndoManager;
use crate::undo::{ActionCommand, SetValueCommand, UndoCommand};
use crate::value::{
    copy_into, deep_clone, values_equal, values_equal_opt, Action, ClickOutcome, Key, Value,
};
use chrono::Utc;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// Numeric constraints of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Value pipeline shared by renderers
///
/// Cloning is cheap; clones share the scheduler and undo manager.
#[derive(Clone)]
pub struct ConfigMethods {
    scheduler: Arc<FrameScheduler>,
    pipeline: Arc<Pipeline>,
}

/// The synchronous half of the pipeline, captured by deferred operations
struct Pipeline {
    undo_manager: Option<Arc<dyn UndoManager>>,
    coalesce_window: chrono::Duration,
    default_mode: DispatchMode,
}

impl ConfigMethods {
    /// Create the pipeline
    ///
    /// # Parameters
    ///
    /// - `scheduler`: Phase scheduler deferred operations are registered with
    /// - `undo_manager`: History to record into; `None` disables undo
    /// - `settings`: Coalescing window and default dispatch mode
    pub fn new(
        scheduler: Arc<FrameScheduler>,
        undo_manager: Option<Arc<dyn UndoManager>>,
        settings: &UiConfigSettings,
    ) -> Self {
        Self {
            scheduler,
            pipeline: Arc::new(Pipeline {
                undo_manager,
                coalesce_window: settings.coalesce_window(),
                default_mode: settings.default_dispatch_mode,
            }),
        }
    }

    /// Scheduler used for deferred operations
    pub fn scheduler(&self) -> &Arc<FrameScheduler> {
        &self.scheduler
    }

    /// Undo manager, if any
    pub fn undo_manager(&self) -> Option<&Arc<dyn UndoManager>> {
        self.pipeline.undo_manager.as_ref()
    }

    /// Dispatch mode of a node, falling back to the configured default
    pub fn dispatch_mode(&self, node: &ConfigNode) -> DispatchMode {
        node.dispatch_mode().unwrap_or(self.pipeline.default_mode)
    }

    /// Resolve a node's binding location
    pub fn binding(&self, node: &ConfigNode, include_parent_fallback: bool) -> Option<Binding> {
        resolve(node, include_parent_fallback)
    }

    /// The bound value, uncloned
    pub fn raw_value(&self, node: &ConfigNode) -> Option<Value> {
        resolve(node, true).and_then(|b| b.get())
    }

    /// The bound value, cloned
    pub fn value(&self, node: &ConfigNode) -> Option<Value> {
        self.read(node, None, true)
    }

    /// Read the bound value
    ///
    /// # Parameters
    ///
    /// - `previous`: A value held by the caller; the bound value is copied
    ///   into it in place when possible
    /// - `copy_if_equal`: When `false`, an unchanged value yields `None`,
    ///   which lets a caller skip redundant updates
    ///
    /// # Returns
    ///
    /// - `None` when unbound, or unchanged and `copy_if_equal` is off
    /// - `Some(value)`: `previous` updated in place, or a clone of the bound value
    pub fn read(&self, node: &ConfigNode, previous: Option<Value>, copy_if_equal: bool) -> Option<Value> {
        let binding = resolve(node, true)?;
        let raw = binding.get();
        match (previous, raw) {
            (Some(prev), Some(raw)) => {
                if !copy_if_equal && values_equal(&prev, &raw) {
                    None
                } else {
                    Some(copy_into(prev, &raw))
                }
            }
            (_, raw) => raw.map(|r| deep_clone(&r)),
        }
    }

    /// Write a value through the node's binding at its dispatch phase
    ///
    /// # Parameters
    ///
    /// - `value`: The new value
    /// - `props`: `last` marks the end of a burst (defaults to `true`)
    /// - `force_change_event`: Dispatch the change event even when the write
    ///   is rejected
    /// - `track_undo`: Offer the write to the undo coalescer
    ///
    /// # Returns
    ///
    /// A [`Deferred`] resolving to whether the write was accepted.
    pub fn write(
        &self,
        node: &NodeRef,
        value: impl Into<Value>,
        props: ChangeProps,
        force_change_event: bool,
        track_undo: bool,
    ) -> Deferred<bool> {
        let pipeline = self.pipeline.clone();
        let node = node.clone();
        let value = value.into();
        self.scheduler.run_at_event(self.dispatch_mode(&node), move || {
            pipeline.write(&node, value, props, force_change_event, track_undo)
        })
    }

    /// Write synchronously, ignoring the dispatch mode
    pub fn write_now(
        &self,
        node: &NodeRef,
        value: impl Into<Value>,
        props: ChangeProps,
        force_change_event: bool,
        track_undo: bool,
    ) -> bool {
        self.pipeline
            .write(node, value.into(), props, force_change_event, track_undo)
    }

    /// Invoke a button node's action and `onClick` handler at its dispatch phase
    pub fn click_button(&self, node: &NodeRef, args: Vec<Value>) -> Deferred<()> {
        let pipeline = self.pipeline.clone();
        let node = node.clone();
        self.scheduler
            .run_at_event(self.dispatch_mode(&node), move || pipeline.click(&node, args))
    }

    /// Click synchronously, ignoring the dispatch mode
    pub fn click_button_now(&self, node: &NodeRef, args: Vec<Value>) {
        self.pipeline.click(node, args)
    }

    /// Dispatch a change event at the node's dispatch phase
    pub fn dispatch_change(&self, node: &NodeRef, props: ChangeProps, extra: Vec<Value>) -> Deferred<()> {
        let pipeline = self.pipeline.clone();
        let node = node.clone();
        self.scheduler.run_at_event(self.dispatch_mode(&node), move || {
            pipeline.dispatch_change_sync(&node, props, &extra)
        })
    }

    /// Dispatch a change event now
    ///
    /// Calls the node's listeners, then the parent notifier.
    pub fn dispatch_change_sync(&self, node: &NodeRef, props: ChangeProps, extra: &[Value]) {
        self.pipeline.dispatch_change_sync(node, props, extra)
    }

    /// Offer a command to the undo coalescer
    pub fn record_undo(&self, command: UndoCommand) {
        self.pipeline.record_undo(command)
    }

    /// Undo the most recent command
    ///
    /// Resolves to `false` when there is nothing to undo.
    pub fn undo(&self) -> Deferred<bool> {
        match self.undo_manager().and_then(|m| m.take_undo()) {
            Some(command) => self.replay(command, Replay::Undo),
            None => Deferred::ready(false),
        }
    }

    /// Redo the most recently undone command
    pub fn redo(&self) -> Deferred<bool> {
        match self.undo_manager().and_then(|m| m.take_redo()) {
            Some(command) => self.replay(command, Replay::Redo),
            None => Deferred::ready(false),
        }
    }

    fn replay(&self, command: UndoCommand, direction: Replay) -> Deferred<bool> {
        match command {
            UndoCommand::SetValue(cmd) => {
                let value = match direction {
                    Replay::Undo => cmd.previous.clone().unwrap_or(Value::Null),
                    Replay::Redo => cmd.value.clone(),
                };
                // replayed writes always end a burst and must read the live value
                let props = ChangeProps {
                    last: Some(true),
                    last_value: None,
                    ..cmd.props.clone()
                };
                let pipeline = self.pipeline.clone();
                let node = cmd.node.clone();
                debug!(node = node.id(), ?direction, "Replaying value change");
                self.scheduler.run_at_event(self.dispatch_mode(&node), move || {
                    let accepted = pipeline.write(&node, value, props, false, false);
                    node.request_refresh(false, None, Duration::ZERO);
                    accepted
                })
            }
            UndoCommand::Action(cmd) => {
                debug!(node = cmd.node.id(), ?direction, "Replaying action");
                match direction {
                    Replay::Undo => {
                        cmd.undo.call(&cmd.args);
                    }
                    Replay::Redo => {
                        if let Some(redo) = &cmd.redo {
                            redo.call(&cmd.args);
                        }
                    }
                }
                cmd.node.request_refresh(false, None, Duration::ZERO);
                Deferred::ready(true)
            }
        }
    }

    /// Display label: the label, else the binding key
    pub fn label(&self, node: &ConfigNode) -> String {
        node.label()
            .or_else(|| resolve(node, true).map(|b| b.key.to_string()))
            .unwrap_or_default()
    }

    /// Evaluated, flattened children
    pub fn children(&self, node: &ConfigNode) -> Vec<NodeRef> {
        node.children()
    }

    /// Numeric bounds and step of a node
    ///
    /// Missing bounds default to `[0, 1]`, or `±∞` when `unbounded`. The step
    /// is the node's step size, else `0.01` when unbounded, else the power of
    /// ten closest below a hundredth of the range.
    pub fn bounds(&self, node: &ConfigNode, unbounded: bool) -> Bounds {
        let bounds = node.raw_bounds().unwrap_or_default();
        let max = match bounds.get(1) {
            Some(max) => *max,
            None if unbounded => f64::INFINITY,
            None => 1.0,
        };
        let min = match bounds.first() {
            Some(min) => *min,
            None if unbounded => f64::NEG_INFINITY,
            None => 0.0,
        };
        let step = match node.step_size() {
            Some(step) if step != 0.0 && !step.is_nan() => step,
            _ if unbounded => 0.01,
            _ => 10f64.powi(((max - min) / 100.0).log10().floor() as i32),
        };
        Bounds { min, max, step }
    }

    /// Prepare a node for rendering
    ///
    /// A missing kind defaults to `"input"` with a warning; the identity is
    /// assigned.
    pub fn init_node(&self, node: &ConfigNode) {
        if node.kind().is_none() {
            warn!(label = ?node.label(), "Config node has no kind, defaulting to input");
            node.set_kind("input");
        }
        node.id();
    }

    /// Link a child to its parent
    ///
    /// Installs a notifier that re-dispatches the child's change events and
    /// their extra arguments from the parent. Also installs a fallback binding
    /// to the parent's binding location unless the child already has one.
    pub fn attach_child(&self, parent: &NodeRef, child: &NodeRef) {
        let weak: Weak<ConfigNode> = Arc::downgrade(parent);
        let pipeline = self.pipeline.clone();
        child.set_parent_notifier(Some(Arc::new(move |event: &ChangeEvent, extra: &[Value]| {
            if let Some(parent) = weak.upgrade() {
                pipeline.dispatch_change_sync(&parent, event.bubble(), extra);
            }
        })));

        if !child.has_parent_binding() {
            let weak: Weak<ConfigNode> = Arc::downgrade(parent);
            child.set_parent_binding(Some(Arc::new(move || {
                weak.upgrade().and_then(|p| p.binding())
            })));
        }
    }

    /// Whether the node should be hidden
    pub fn is_hidden(&self, node: &ConfigNode) -> bool {
        node.flag(|p| p.hidden.clone()).unwrap_or(false)
    }

    /// Whether the node's input should be disabled
    pub fn is_disabled(&self, node: &ConfigNode) -> bool {
        node.flag(|p| p.disabled.clone()).unwrap_or(false)
    }

    /// Whether the node's input should be read-only
    ///
    /// Also true for nodes with a getter but no setter.
    pub fn is_read_only(&self, node: &ConfigNode) -> bool {
        if node.flag(|p| p.read_only.clone()).unwrap_or(false) {
            return true;
        }
        matches!(
            node.value_slot().as_deref(),
            Some(ValueSlot::Accessor { set: None, .. })
        )
    }

    /// Whether a folder node starts expanded
    pub fn is_expanded(&self, node: &ConfigNode) -> bool {
        node.flag(|p| p.expanded.clone()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy)]
enum Replay {
    Undo,
    Redo,
}

impl Pipeline {
    fn write(
        &self,
        node: &NodeRef,
        value: Value,
        props: ChangeProps,
        force_change_event: bool,
        track_undo: bool,
    ) -> bool {
        let binding = resolve(node, true);
        let last_raw = props
            .last_value
            .clone()
            .or_else(|| binding.as_ref().and_then(|b| b.get()));
        let is_final = props.last.unwrap_or(true);

        let same = values_equal_opt(last_raw.as_ref(), Some(&value));
        let last_value = last_raw.as_ref().map(deep_clone);

        let accepted = if same {
            is_final
        } else if let Some(binding) = &binding {
            match &last_raw {
                Some(raw) if copy_into(raw.clone(), &value).same_instance(raw) => true,
                _ => safe_set(binding, &value),
            }
        } else {
            false
        };

        if !accepted {
            debug!(node = node.id(), same, "Write rejected");
            if !force_change_event {
                return false;
            }
        }

        if track_undo && accepted && (is_final || !same) {
            self.record_undo(UndoCommand::SetValue(SetValueCommand {
                node: node.clone(),
                previous: last_value.clone(),
                value: value.clone(),
                is_final,
                props: props.clone(),
                timestamp: Utc::now(),
            }));
        }

        self.dispatch_change_sync(
            node,
            ChangeProps {
                last: Some(is_final),
                value: Some(value),
                last_value,
                ..props
            },
            &[],
        );
        accepted
    }

    fn click(&self, node: &NodeRef, args: Vec<Value>) {
        let args = if node.send_args() == Some(false) { Vec::new() } else { args };

        let mut actions: Vec<(Action, Option<Target>)> = Vec::new();
        if let Some(binding) = resolve(node, false) {
            let bound = binding
                .get()
                .filter(|v| !v.is_null())
                .or_else(|| binding.target.get(&Key::name("value")));
            match bound {
                Some(Value::Function(action)) => actions.push((action, Some(binding.target.clone()))),
                Some(other) if other.is_truthy() => {
                    warn!(node = node.id(), found = other.type_name(), "Invalid action type for button");
                }
                _ => {}
            }
        }
        if let Some(on_click) = node.on_click() {
            actions.push((on_click, None));
        }

        for (action, target) in actions {
            let (undo, redo) = match action.call(&args) {
                ClickOutcome::None => (None, None),
                ClickOutcome::Undo(undo) => (Some(undo), Some(action.clone())),
                ClickOutcome::Reversible(reversible) => {
                    if let Some(now) = &reversible.action {
                        now.call(&[]);
                    }
                    (reversible.undo, reversible.redo.or(reversible.action))
                }
            };
            if let Some(undo) = undo {
                self.record_undo(UndoCommand::Action(ActionCommand {
                    node: node.clone(),
                    target,
                    undo,
                    redo,
                    args: args.clone(),
                }));
            }
        }

        self.dispatch_change_sync(node, ChangeProps::default(), &[]);
    }

    fn dispatch_change_sync(&self, node: &NodeRef, props: ChangeProps, extra: &[Value]) {
        let mut config_path = Vec::with_capacity(props.config_path.len() + 1);
        config_path.push(node.clone());
        config_path.extend(props.config_path);

        let event = ChangeEvent {
            last: props.last.unwrap_or(true),
            config: props.config.unwrap_or_else(|| node.clone()),
            config_path,
            target: node.clone(),
            value: props.value,
            last_value: props.last_value,
        };

        if let Some(listeners) = node.listeners() {
            for listener in listeners.flatten() {
                listener(&event, extra);
            }
        }
        if let Some(notify_parent) = node.parent_notifier() {
            notify_parent(&event, extra);
        }
    }

    fn record_undo(&self, command: UndoCommand) {
        let Some(manager) = self.undo_manager.as_ref().filter(|m| m.is_enabled()) else {
            return;
        };

        let mut cmd = match command {
            UndoCommand::SetValue(cmd) => cmd,
            action => return manager.record(action),
        };

        if let Some(UndoCommand::SetValue(last)) = manager.peek() {
            if Arc::ptr_eq(&last.node, &cmd.node)
                && !last.is_final
                && cmd.timestamp - last.timestamp < self.coalesce_window
            {
                cmd.previous = last.previous;
                cmd.value = deep_clone(&cmd.value);
                manager.replace_last(UndoCommand::SetValue(cmd));
                return;
            }
        }

        if !values_equal_opt(cmd.previous.as_ref(), Some(&cmd.value)) {
            cmd.value = deep_clone(&cmd.value);
            manager.record(UndoCommand::SetValue(cmd));
        }
    }
}

/// Set a value and check the container kept it
fn safe_set(binding: &Binding, value: &Value) -> bool {
    binding.set(value.clone()) && values_equal_opt(binding.get().as_ref(), Some(value))
}
