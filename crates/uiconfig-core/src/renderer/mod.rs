//! Renderer base
//!
//! The ConfigRenderer is responsible for:
//! - Owning the root panel node and its children
//! - Rendering nodes through a pluggable RenderBackend
//! - Queueing refreshes per dispatch phase and running them when due
//! - Disposing render handles without touching application data
//! - Driving frames, either explicitly (`tick`, `run_frame`) or from a tokio interval
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────────┐
//!   write / click ───▶│  ConfigMethods   │─── change events ──▶ listeners
//!                     └──────────────────┘
//!                              │ deferred to phase
//!                              ▼
//! ┌─────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ host loop   │────▶│  ConfigRenderer  │────▶│ RenderBackend  │
//! │ (tick)      │     │  + scheduler     │     │ (render/refresh)│
//! └─────────────┘     └──────────────────┘     └────────────────┘
//!                              │
//!                              ▼
//!                      RendererEvent (mpsc)
//! ```
//!
//! ## Frame Flow
//!
//! For each phase in order (pre-frame, pre-render, post-render, post-frame):
//!
//! 1. Drain the phase's refresh queue and refresh the nodes that are due
//! 2. Fire the phase's one-shot listeners (deferred writes, clicks, dispatches)

use crate::config::UiConfigSettings;
use crate::error::Result;
use crate::methods::ConfigMethods;
use crate::node::{ConfigNode, NodeRef};
use crate::scheduler::{DispatchMode, FrameScheduler, Phase};
use crate::traits::{RenderBackend, UndoManager};
use crate::tree::flatten_where;
use crate::undo::UndoHistory;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Events emitted by the ConfigRenderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    /// A node was rendered (or re-rendered after its kind changed)
    Rendered { node_id: String, kind: String },

    /// A rendered node was refreshed
    Refreshed { node_id: String },

    /// A node's render handle was released
    Disposed { node_id: String },

    /// A node was appended to the root panel
    ChildAppended { node_id: String },

    /// A node was removed from the root panel
    ChildRemoved { node_id: String },
}

struct Shared {
    methods: ConfigMethods,
    backend: Arc<dyn RenderBackend>,
    root: NodeRef,
    event_tx: mpsc::Sender<RendererEvent>,
    settings: UiConfigSettings,
}

/// Renders a config tree through a backend and schedules its refreshes
///
/// Cloning is cheap; clones drive the same tree.
#[derive(Clone)]
pub struct ConfigRenderer {
    shared: Arc<Shared>,
}

impl ConfigRenderer {
    /// Create a new renderer
    ///
    /// # Parameters
    ///
    /// - `backend`: Concrete UI toolkit
    /// - `methods`: Value pipeline; its scheduler drives this renderer's frames
    /// - `settings`: Root label, event channel capacity, frame interval
    ///
    /// # Returns
    ///
    /// - `Ok((renderer, event_rx))`: The renderer and its lifecycle event receiver
    /// - `Err(Error)`: If the settings are invalid
    pub fn new(
        backend: Arc<dyn RenderBackend>,
        methods: ConfigMethods,
        settings: UiConfigSettings,
    ) -> Result<(Self, mpsc::Receiver<RendererEvent>)> {
        settings.validate()?;

        let (tx, rx) = mpsc::channel(settings.event_channel_capacity);
        let root = ConfigNode::builder("panel")
            .label(settings.root_label.clone())
            .build();

        let renderer = Self {
            shared: Arc::new(Shared {
                methods,
                backend,
                root,
                event_tx: tx,
                settings,
            }),
        };
        Ok((renderer, rx))
    }

    /// Create a renderer with its own scheduler and bounded undo history
    pub fn with_history(
        backend: Arc<dyn RenderBackend>,
        settings: UiConfigSettings,
    ) -> Result<(Self, mpsc::Receiver<RendererEvent>, Arc<UndoHistory>)> {
        let history = Arc::new(UndoHistory::from_settings(&settings));
        let manager: Arc<dyn UndoManager> = history.clone();
        let methods = ConfigMethods::new(Arc::new(FrameScheduler::new()), Some(manager), &settings);
        let (renderer, rx) = Self::new(backend, methods, settings)?;
        Ok((renderer, rx, history))
    }

    /// Root panel node
    pub fn root(&self) -> &NodeRef {
        &self.shared.root
    }

    /// Value pipeline
    pub fn methods(&self) -> &ConfigMethods {
        &self.shared.methods
    }

    /// Settings the renderer was created with
    pub fn settings(&self) -> &UiConfigSettings {
        &self.shared.settings
    }

    fn scheduler(&self) -> &Arc<FrameScheduler> {
        self.shared.methods.scheduler()
    }

    /// Render the root panel and everything already attached to it
    pub fn mount(&self) -> Result<()> {
        info!(backend = self.shared.backend.backend_name(), "Mounting config renderer");
        self.render_ui_config(self.root())
    }

    /// Render a node and its children
    ///
    /// Initializes the node, stores the backend's handle on it and installs
    /// its refresh function. Children are attached to the node and rendered
    /// unless they already are; a child that fails to render is logged and
    /// skipped.
    ///
    /// # Returns
    ///
    /// - `Err(Error)`: If the backend could not render the node itself
    pub fn render_ui_config(&self, node: &NodeRef) -> Result<()> {
        let methods = self.methods();
        methods.init_node(node);

        let handle = self.shared.backend.render(node, methods)?;
        let kind = node.kind();
        node.set_render_handle(handle, kind.clone());

        let renderer: Weak<Shared> = Arc::downgrade(&self.shared);
        let target: Weak<ConfigNode> = Arc::downgrade(node);
        node.set_refresh_fn(Some(Arc::new(move |deep, mode, delay| {
            if let (Some(shared), Some(node)) = (renderer.upgrade(), target.upgrade()) {
                let renderer = ConfigRenderer { shared };
                let mode = mode.unwrap_or_else(|| renderer.methods().dispatch_mode(&node));
                renderer.add_to_refresh_queue(mode, &node, deep, delay);
            }
        })));

        debug!(node = node.id(), kind = ?kind, "Rendered config node");
        self.emit_event(RendererEvent::Rendered {
            node_id: node.id().to_string(),
            kind: kind.unwrap_or_default(),
        });

        self.render_children(node);
        Ok(())
    }

    fn render_children(&self, node: &NodeRef) {
        for child in node.children() {
            self.methods().attach_child(node, &child);
            if child.is_rendered() {
                continue;
            }
            if let Err(e) = self.render_ui_config(&child) {
                warn!(parent = node.id(), child = child.id(), error = %e, "Failed to render child");
            }
        }
    }

    /// Queue a refresh of `node` (and, when `deep`, its rendered descendants)
    ///
    /// `DispatchMode::Immediate` bypasses the queue: the refresh runs after
    /// `delay` on the current tokio runtime, or inline when there is none.
    pub fn add_to_refresh_queue(&self, mode: DispatchMode, node: &NodeRef, deep: bool, delay: Duration) {
        let nodes = if deep {
            flatten_where(node, ConfigNode::is_rendered)
        } else {
            vec![node.clone()]
        };

        for node in nodes {
            match mode.phase() {
                Some(phase) => self.scheduler().enqueue(phase, &node, delay),
                None => self.refresh_immediately(node, delay),
            }
        }
    }

    fn refresh_immediately(&self, node: NodeRef, delay: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let renderer = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    renderer.refresh_node(&node);
                });
            }
            Err(_) => self.refresh_node(&node),
        }
    }

    /// Refresh the root panel
    pub fn refresh_root(&self, deep: bool, mode: DispatchMode, delay: Duration) {
        self.root().request_refresh(deep, Some(mode), delay);
    }

    /// Append a node to the root panel and request a deep root refresh
    pub fn append_child(&self, node: NodeRef) {
        self.emit_event(RendererEvent::ChildAppended {
            node_id: node.id().to_string(),
        });
        self.root().push_child(node);
        self.refresh_root(true, DispatchMode::PostFrame, Duration::ZERO);
    }

    /// Remove a node from the root panel, dispose it and request a deep root refresh
    ///
    /// Returns `false` when the node isn't a child of the root.
    pub fn remove_child(&self, node: &NodeRef) -> bool {
        if !self.root().remove_child(node) {
            return false;
        }
        self.dispose_ui_config(node, true);
        self.emit_event(RendererEvent::ChildRemoved {
            node_id: node.id().to_string(),
        });
        self.refresh_root(true, DispatchMode::PostFrame, Duration::ZERO);
        true
    }

    /// Release a node's render handle
    ///
    /// Calls the handle's `dispose` when `perform_dispose` is set, then
    /// clears the handle kind and refresh function. The node's data and
    /// parent links are left alone.
    pub fn dispose_ui_config(&self, node: &ConfigNode, perform_dispose: bool) {
        let handle = node.clear_render_state();
        if let Some(handle) = handle {
            if perform_dispose {
                handle.dispose();
            }
            self.emit_event(RendererEvent::Disposed {
                node_id: node.id().to_string(),
            });
        }
    }

    /// Dispose the root panel and every rendered node below it
    pub fn unmount(&self) {
        let rendered = flatten_where(self.root(), ConfigNode::is_rendered);
        for node in rendered.iter().rev() {
            self.dispose_ui_config(node, true);
        }
        info!("Config renderer unmounted");
    }

    /// Refresh one node now
    ///
    /// Unrendered (or disposed) nodes are skipped. A node whose kind changed
    /// since it was rendered is disposed and rendered again. Children that
    /// appeared since the last refresh are rendered.
    pub fn refresh_node(&self, node: &NodeRef) {
        if !node.is_rendered() {
            return;
        }

        if node.kind() != node.render_handle_kind() {
            debug!(node = node.id(), "Kind changed, re-rendering");
            self.dispose_ui_config(node, true);
            if let Err(e) = self.render_ui_config(node) {
                error!(node = node.id(), error = %e, "Failed to re-render config node");
            }
            return;
        }

        self.shared.backend.refresh(node, self.methods());
        self.render_children(node);
        self.emit_event(RendererEvent::Refreshed {
            node_id: node.id().to_string(),
        });
    }

    /// Run one dispatch phase
    ///
    /// Refreshes the queued nodes that are due after `elapsed`, then fires the
    /// phase's one-shot listeners.
    pub fn tick(&self, phase: Phase, elapsed: Duration) {
        for node in self.scheduler().drain(phase, elapsed) {
            self.refresh_node(&node);
        }
        self.scheduler().fire(phase);
    }

    /// Run one dispatch phase using wall time since its last drain
    pub fn tick_now(&self, phase: Phase) {
        for node in self.scheduler().drain_now(phase) {
            self.refresh_node(&node);
        }
        self.scheduler().fire(phase);
    }

    /// Run all four phases in order
    pub fn run_frame(&self, elapsed: Duration) {
        for phase in Phase::ALL {
            self.tick(phase, elapsed);
        }
    }

    /// Drive frames from a tokio interval
    ///
    /// The loop holds only a weak reference and ends once every renderer
    /// clone has been dropped.
    pub fn spawn_frame_loop(&self) -> JoinHandle<()> {
        let period = self.settings().frame_interval();
        let weak = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last = Instant::now();
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    debug!("Renderer dropped, stopping frame loop");
                    break;
                };
                let now = Instant::now();
                ConfigRenderer { shared }.run_frame(now - last);
                last = now;
            }
        })
    }

    /// Emit a renderer event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: RendererEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.shared.event_tx.try_send(event) {
            warn!("Renderer event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
