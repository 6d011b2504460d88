// # Undo Manager Trait
//
// Storage side of undo/redo. The coalescing policy (when a write merges with
// the previous entry) lives in `ConfigMethods`; the manager only keeps the
// two stacks.
//
// ## Implementations
//
// - `UndoHistory`: bounded in-memory history (bundled)

use crate::undo::UndoCommand;

/// Trait for undo history implementations
///
/// Implementations must be thread-safe; every method takes `&self`.
pub trait UndoManager: Send + Sync {
    /// Whether commands are currently being recorded
    fn is_enabled(&self) -> bool;

    /// Push a new command, clearing the redo stack
    fn record(&self, command: UndoCommand);

    /// Most recent undoable command, without removing it
    fn peek(&self) -> Option<UndoCommand>;

    /// Replace the most recent undoable command in place
    ///
    /// Records the command instead when the history is empty.
    fn replace_last(&self, command: UndoCommand);

    /// Move the most recent undoable command onto the redo stack and return it
    fn take_undo(&self) -> Option<UndoCommand>;

    /// Move the most recent redoable command back onto the undo stack and return it
    fn take_redo(&self) -> Option<UndoCommand>;
}
