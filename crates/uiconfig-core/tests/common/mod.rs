//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that observe the binding layer
//! from the outside without implementing a real UI toolkit.

#![allow(dead_code)]

use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uiconfig_core::error::Result;
use uiconfig_core::methods::{ChangeEvent, ConfigMethods};
use uiconfig_core::node::NodeRef;
use uiconfig_core::scheduler::FrameScheduler;
use uiconfig_core::traits::{RenderBackend, RenderHandle, UndoManager};
use uiconfig_core::value::{ObjectRef, ObjectValue, PrimitiveObject, Value};
use uiconfig_core::{UiConfigSettings, UndoHistory};

/// A backend that only counts what it was asked to do
#[derive(Default)]
pub struct CountingBackend {
    renders: AtomicUsize,
    refreshes: AtomicUsize,
    disposals: Arc<AtomicUsize>,
    refreshed: Mutex<Vec<String>>,
}

impl CountingBackend {
    /// Create a new counting backend
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of render() calls
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Number of refresh() calls
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Number of handles disposed
    pub fn dispose_count(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    /// Ids of refreshed nodes, in order
    pub fn refreshed_ids(&self) -> Vec<String> {
        self.refreshed.lock().clone()
    }
}

struct CountingHandle {
    disposals: Arc<AtomicUsize>,
}

impl RenderHandle for CountingHandle {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

impl RenderBackend for CountingBackend {
    fn render(&self, _node: &NodeRef, _methods: &ConfigMethods) -> Result<Box<dyn RenderHandle>> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingHandle {
            disposals: self.disposals.clone(),
        }))
    }

    fn refresh(&self, node: &NodeRef, _methods: &ConfigMethods) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.refreshed.lock().push(node.id().to_string());
    }

    fn backend_name(&self) -> &str {
        "counting"
    }
}

/// A three component vector implementing the primitive protocol
#[derive(Debug)]
pub struct Vec3 {
    xyz: RwLock<[f64; 3]>,
}

impl Vec3 {
    /// Create a shared vector
    pub fn new(x: f64, y: f64, z: f64) -> Arc<Self> {
        Arc::new(Self {
            xyz: RwLock::new([x, y, z]),
        })
    }

    /// Current components
    pub fn components(&self) -> [f64; 3] {
        *self.xyz.read()
    }
}

impl ObjectValue for Vec3 {
    fn get(&self, key: &str) -> Option<Value> {
        let xyz = self.xyz.read();
        match key {
            "x" => Some(Value::from(xyz[0])),
            "y" => Some(Value::from(xyz[1])),
            "z" => Some(Value::from(xyz[2])),
            _ => None,
        }
    }

    fn set(&self, key: &str, value: Value) -> bool {
        let Some(n) = value.as_f64() else {
            return false;
        };
        let mut xyz = self.xyz.write();
        match key {
            "x" => xyz[0] = n,
            "y" => xyz[1] = n,
            "z" => xyz[2] = n,
            _ => return false,
        }
        true
    }

    fn keys(&self) -> Vec<String> {
        vec!["x".into(), "y".into(), "z".into()]
    }

    fn primitive(&self) -> Option<&dyn PrimitiveObject> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PrimitiveObject for Vec3 {
    fn clone_object(&self) -> ObjectRef {
        let [x, y, z] = self.components();
        Vec3::new(x, y, z)
    }

    fn equals(&self, other: &Value) -> bool {
        match other.as_object().and_then(|o| o.as_any().downcast_ref::<Vec3>()) {
            Some(v) => v.components() == self.components(),
            None => false,
        }
    }

    fn copy_from(&self, other: &ObjectRef) {
        if let Some(v) = other.as_any().downcast_ref::<Vec3>() {
            let xyz = v.components();
            *self.xyz.write() = xyz;
        }
    }
}

/// Value pipeline wired to a fresh scheduler and an unbounded-enough history
pub fn methods() -> (ConfigMethods, Arc<UndoHistory>) {
    methods_with(UiConfigSettings::default())
}

/// Like [`methods`], with explicit settings
pub fn methods_with(settings: UiConfigSettings) -> (ConfigMethods, Arc<UndoHistory>) {
    let history = Arc::new(UndoHistory::from_settings(&settings));
    let manager: Arc<dyn UndoManager> = history.clone();
    let methods = ConfigMethods::new(Arc::new(FrameScheduler::new()), Some(manager), &settings);
    (methods, history)
}

/// Collects the change events a node's listener receives
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
    extras: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener appending to this log
    pub fn listener(&self) -> impl Fn(&ChangeEvent, &[Value]) + Send + Sync + 'static {
        let events = self.events.clone();
        let extras = self.extras.clone();
        move |event, extra| {
            events.lock().push(event.clone());
            extras.lock().push(extra.to_vec());
        }
    }

    /// Recorded events
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().clone()
    }

    /// Extra arguments passed alongside each recorded event
    pub fn extras(&self) -> Vec<Vec<Value>> {
        self.extras.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}
