//! Core traits for the uiconfig system
//!
//! This module defines the seams where hosts plug in their own behavior.
//!
//! - [`RenderBackend`]: Turn config nodes into concrete UI and refresh them
//! - [`RenderHandle`]: Renderer-owned resource attached to a rendered node
//! - [`UndoManager`]: Bounded history of undoable commands

pub mod render_backend;
pub mod undo_manager;

pub use render_backend::{RenderBackend, RenderHandle};
pub use undo_manager::UndoManager;
