// # Frame Scheduler
//
// Cooperative, phase-based scheduling for the binding layer.
//
// ## Phases
//
// Every frame runs four dispatch phases in order: pre-frame, pre-render,
// post-render, post-frame. For each phase the scheduler keeps:
//
// - a **refresh queue** of nodes waiting to be re-rendered, keyed by node
//   identity, each with a remaining delay
// - a list of **one-shot listeners** (deferred reads, writes and clicks)
//
// The host drives it explicitly: `drain` hands back the refreshes that are
// due, `fire` runs the listeners registered so far. `ConfigRenderer::tick`
// does both for one phase.
//
// ## Deferred operations
//
// `run_at_event` either runs an operation now (`DispatchMode::Immediate`) or
// registers it for the next occurrence of a phase. The returned `Deferred`
// is a future that resolves with the operation's result once the phase has
// fired.

use crate::node::{NodeId, NodeRef};
use crate::{Error, Result};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::trace;

/// Remaining delay at or below which a queued refresh counts as due
const DUE_EPSILON: Duration = Duration::from_millis(1);

/// A dispatch phase of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreFrame,
    PreRender,
    PostRender,
    PostFrame,
}

impl Phase {
    /// All phases in frame order
    pub const ALL: [Phase; 4] = [
        Phase::PreFrame,
        Phase::PreRender,
        Phase::PostRender,
        Phase::PostFrame,
    ];

    fn index(self) -> usize {
        match self {
            Phase::PreFrame => 0,
            Phase::PreRender => 1,
            Phase::PostRender => 2,
            Phase::PostFrame => 3,
        }
    }

    /// Phase name as used in configuration
    pub fn name(self) -> &'static str {
        match self {
            Phase::PreFrame => "preFrame",
            Phase::PreRender => "preRender",
            Phase::PostRender => "postRender",
            Phase::PostFrame => "postFrame",
        }
    }
}

/// When a node's deferred operations and refreshes run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchMode {
    PreFrame,
    PreRender,
    PostRender,
    #[default]
    PostFrame,
    /// Run synchronously, bypassing the phase queues
    Immediate,
}

impl DispatchMode {
    /// Phase for this mode; `None` for [`DispatchMode::Immediate`]
    pub fn phase(self) -> Option<Phase> {
        match self {
            DispatchMode::PreFrame => Some(Phase::PreFrame),
            DispatchMode::PreRender => Some(Phase::PreRender),
            DispatchMode::PostRender => Some(Phase::PostRender),
            DispatchMode::PostFrame => Some(Phase::PostFrame),
            DispatchMode::Immediate => None,
        }
    }
}

impl From<Phase> for DispatchMode {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::PreFrame => DispatchMode::PreFrame,
            Phase::PreRender => DispatchMode::PreRender,
            Phase::PostRender => DispatchMode::PostRender,
            Phase::PostFrame => DispatchMode::PostFrame,
        }
    }
}

/// Queued refresh of one node
#[derive(Debug, Clone)]
pub struct RefreshEntry {
    /// Node to refresh
    pub node: NodeRef,
    /// Time left before the refresh is due
    pub remaining: Duration,
}

type PhaseListener = Box<dyn FnOnce() + Send>;

/// Result of an operation scheduled with [`FrameScheduler::run_at_event`]
///
/// Resolves to `Err(Error::Cancelled)` if the operation is dropped before
/// its phase fires (for example when the scheduler itself is dropped).
#[must_use = "a Deferred does nothing unless awaited or polled"]
#[derive(Debug)]
pub struct Deferred<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Deferred<T> {
    /// An already resolved result
    pub fn ready(value: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(value);
        Self { rx }
    }

    /// Take the result if the operation has already run
    pub fn try_take(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.map_err(|_| Error::cancelled("operation dropped before its phase fired")))
    }
}

/// Per-phase refresh queues and one-shot listeners
pub struct FrameScheduler {
    queues: Mutex<[IndexMap<NodeId, RefreshEntry>; 4]>,
    listeners: Mutex<[Vec<PhaseListener>; 4]>,
    last_drain: Mutex<[Instant; 4]>,
}

impl FrameScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            queues: Mutex::new(Default::default()),
            listeners: Mutex::new(Default::default()),
            last_drain: Mutex::new([now; 4]),
        }
    }

    /// Queue a refresh of `node` after `delay`
    ///
    /// If the node is already queued in this phase its remaining delay is
    /// raised to `delay` when that is longer; it is never shortened.
    pub fn enqueue(&self, phase: Phase, node: &NodeRef, delay: Duration) {
        let mut queues = self.queues.lock();
        queues[phase.index()]
            .entry(node.id().to_string())
            .and_modify(|entry| entry.remaining = entry.remaining.max(delay))
            .or_insert_with(|| RefreshEntry {
                node: node.clone(),
                remaining: delay,
            });
    }

    /// Remaining delay of a queued refresh
    pub fn remaining(&self, phase: Phase, node: &NodeRef) -> Option<Duration> {
        self.queues.lock()[phase.index()]
            .get(node.id())
            .map(|e| e.remaining)
    }

    /// Number of queued refreshes in a phase
    pub fn queued(&self, phase: Phase) -> usize {
        self.queues.lock()[phase.index()].len()
    }

    /// Decrement every queued delay by `elapsed` and take the entries that are due
    ///
    /// Due entries are returned in queue order and removed; the others stay
    /// queued for a later drain.
    pub fn drain(&self, phase: Phase, elapsed: Duration) -> Vec<NodeRef> {
        self.last_drain.lock()[phase.index()] = Instant::now();

        let mut queues = self.queues.lock();
        let queue = &mut queues[phase.index()];
        let mut due = Vec::new();
        queue.retain(|_, entry| {
            entry.remaining = entry.remaining.saturating_sub(elapsed);
            if entry.remaining <= DUE_EPSILON {
                due.push(entry.node.clone());
                false
            } else {
                true
            }
        });

        if !due.is_empty() {
            trace!(phase = phase.name(), count = due.len(), "Refreshes due");
        }
        due
    }

    /// Drain using the wall time elapsed since the phase was last drained
    pub fn drain_now(&self, phase: Phase) -> Vec<NodeRef> {
        let elapsed = self.last_drain.lock()[phase.index()].elapsed();
        self.drain(phase, elapsed)
    }

    /// Run the one-shot listeners registered for a phase
    ///
    /// Listeners registered while firing run on the next occurrence.
    pub fn fire(&self, phase: Phase) {
        let listeners = std::mem::take(&mut self.listeners.lock()[phase.index()]);
        if !listeners.is_empty() {
            trace!(phase = phase.name(), count = listeners.len(), "Firing phase listeners");
        }
        for listener in listeners {
            listener();
        }
    }

    /// Register a one-shot listener for the next occurrence of a phase
    pub fn once(&self, phase: Phase, listener: impl FnOnce() + Send + 'static) {
        self.listeners.lock()[phase.index()].push(Box::new(listener));
    }

    /// Number of listeners waiting for a phase
    pub fn pending_listeners(&self, phase: Phase) -> usize {
        self.listeners.lock()[phase.index()].len()
    }

    /// Run `action` now or at the next occurrence of `mode`'s phase
    ///
    /// Registration happens at call time, not when the returned future is
    /// first polled.
    pub fn run_at_event<T: Send + 'static>(
        &self,
        mode: DispatchMode,
        action: impl FnOnce() -> T + Send + 'static,
    ) -> Deferred<T> {
        match mode.phase() {
            None => Deferred::ready(action()),
            Some(phase) => {
                let (tx, rx) = oneshot::channel();
                self.once(phase, move || {
                    let _ = tx.send(action());
                });
                Deferred { rx }
            }
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
