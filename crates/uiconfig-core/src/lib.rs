// # uiconfig-core
//
// Core library for declarative UI configuration trees bound to live
// application data.
//
// ## Architecture Overview
//
// - **ConfigNode**: Declarative description of one UI control or folder
// - **Binding**: Resolution of a node to a `(target, key)` location
// - **ConfigMethods**: Value pipeline (read, write, click, change dispatch, undo)
// - **ClassRegistry**: Field descriptors registered per class, with inheritance
// - **FrameScheduler**: Per-phase refresh queues and one-shot listeners
// - **ConfigRenderer**: Renders a tree through a pluggable RenderBackend
// - **UndoHistory**: Bounded undo/redo stacks with write coalescing
//
// ## Design Principles
//
// 1. **Data stays with the application**: nodes only point at it
// 2. **Backend-agnostic**: toolkits plug in through RenderBackend
// 3. **Frame-driven**: writes and refreshes are deferred to a dispatch phase
// 4. **Library-First**: the host owns the event loop and calls `tick`

pub mod binding;
pub mod config;
pub mod error;
pub mod methods;
pub mod node;
pub mod registry;
pub mod renderer;
pub mod scheduler;
pub mod traits;
pub mod tree;
pub mod undo;
pub mod value;

// Re-export core types for convenience
pub use binding::{Binding, Target};
pub use config::UiConfigSettings;
pub use error::{Error, Result};
pub use methods::{ChangeEvent, ChangeProps, ConfigMethods};
pub use node::{ConfigNode, NodeRef};
pub use registry::{ClassRegistry, FieldDescriptor, FieldParams};
pub use renderer::{ConfigRenderer, RendererEvent};
pub use scheduler::{Deferred, DispatchMode, FrameScheduler, Phase};
pub use traits::{RenderBackend, RenderHandle, UndoManager};
pub use undo::UndoHistory;
pub use value::{Action, ArrayRef, Key, Record, Value};
