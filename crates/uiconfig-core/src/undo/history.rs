// # Undo History
//
// Bounded in-memory implementation of UndoManager.
//
// Two stacks: recording pushes onto the undo stack and clears the redo stack;
// undoing moves the top entry across, redoing moves it back. When the undo
// stack grows past its capacity the oldest entries are dropped.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

use super::UndoCommand;
use crate::traits::UndoManager;

#[derive(Default)]
struct Stacks {
    undo: VecDeque<UndoCommand>,
    redo: Vec<UndoCommand>,
}

/// Undo/redo history stack
///
/// # Example
///
/// ```rust
/// use uiconfig_core::undo::UndoHistory;
/// use uiconfig_core::traits::UndoManager;
///
/// let history = UndoHistory::with_capacity(10);
/// assert!(history.is_enabled());
/// assert!(!history.can_undo());
/// ```
pub struct UndoHistory {
    stacks: Mutex<Stacks>,
    capacity: usize,
    enabled: Mutex<bool>,
}

impl UndoHistory {
    /// Default maximum history size
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Create a history with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a history keeping at most `capacity` undoable entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stacks: Mutex::new(Stacks::default()),
            capacity: capacity.max(1),
            enabled: Mutex::new(true),
        }
    }

    /// Create a history from settings
    pub fn from_settings(settings: &crate::config::UiConfigSettings) -> Self {
        let history = Self::with_capacity(settings.history_capacity);
        history.set_enabled(settings.undo_enabled);
        history
    }

    /// Maximum number of undoable entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Turn recording on or off
    pub fn set_enabled(&self, enabled: bool) {
        *self.enabled.lock() = enabled;
    }

    /// Check if there are commands to undo
    pub fn can_undo(&self) -> bool {
        !self.stacks.lock().undo.is_empty()
    }

    /// Check if there are commands to redo
    pub fn can_redo(&self) -> bool {
        !self.stacks.lock().redo.is_empty()
    }

    /// Number of undoable commands
    pub fn undo_count(&self) -> usize {
        self.stacks.lock().undo.len()
    }

    /// Number of redoable commands
    pub fn redo_count(&self) -> usize {
        self.stacks.lock().redo.len()
    }

    /// Clear all history
    pub fn clear(&self) {
        let mut stacks = self.stacks.lock();
        stacks.undo.clear();
        stacks.redo.clear();
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager for UndoHistory {
    fn is_enabled(&self) -> bool {
        *self.enabled.lock()
    }

    fn record(&self, command: UndoCommand) {
        let mut stacks = self.stacks.lock();
        stacks.undo.push_back(command);
        stacks.redo.clear();

        while stacks.undo.len() > self.capacity {
            stacks.undo.pop_front();
            debug!(capacity = self.capacity, "Undo history full, dropped oldest entry");
        }
    }

    fn peek(&self) -> Option<UndoCommand> {
        self.stacks.lock().undo.back().cloned()
    }

    fn replace_last(&self, command: UndoCommand) {
        let mut stacks = self.stacks.lock();
        match stacks.undo.back_mut() {
            Some(last) => *last = command,
            None => stacks.undo.push_back(command),
        }
    }

    fn take_undo(&self) -> Option<UndoCommand> {
        let mut stacks = self.stacks.lock();
        let command = stacks.undo.pop_back()?;
        stacks.redo.push(command.clone());
        Some(command)
    }

    fn take_redo(&self) -> Option<UndoCommand> {
        let mut stacks = self.stacks.lock();
        let command = stacks.redo.pop()?;
        stacks.undo.push_back(command.clone());
        Some(command)
    }
}
