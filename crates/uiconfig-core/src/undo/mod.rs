//! Undoable commands and the bundled bounded history
//!
//! Two kinds of command are recorded:
//!
//! - [`SetValueCommand`]: a committed write, replayed by writing the stored
//!   previous (undo) or new (redo) value back through the value pipeline
//! - [`ActionCommand`]: a button action, replayed by calling the stored
//!   undo/redo closure with the original arguments
//!
//! Recording policy (including coalescing of write bursts) is owned by
//! [`ConfigMethods`](crate::methods::ConfigMethods).

pub mod history;

pub use history::UndoHistory;

use crate::binding::Target;
use crate::methods::ChangeProps;
use crate::node::NodeRef;
use crate::value::{Action, Value};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A recorded write
#[derive(Clone, Debug)]
pub struct SetValueCommand {
    /// Node the write went through
    pub node: NodeRef,
    /// Value before the write (for a coalesced burst: before its first write)
    pub previous: Option<Value>,
    /// Value after the write
    pub value: Value,
    /// Whether the write ended a burst
    pub is_final: bool,
    /// Props the write was issued with
    pub props: ChangeProps,
    /// When the write was recorded
    pub timestamp: DateTime<Utc>,
}

/// A recorded button action
#[derive(Clone, Debug)]
pub struct ActionCommand {
    /// Node the click went through
    pub node: NodeRef,
    /// Container the action was bound to
    pub target: Option<Target>,
    /// Reverses the action
    pub undo: Action,
    /// Re-applies the action; `None` makes redo a no-op
    pub redo: Option<Action>,
    /// Arguments of the original click
    pub args: Vec<Value>,
}

/// An entry of the undo history
#[derive(Clone, Debug)]
pub enum UndoCommand {
    SetValue(SetValueCommand),
    Action(ActionCommand),
}

impl UndoCommand {
    /// Node the command was recorded for
    pub fn node(&self) -> &NodeRef {
        match self {
            UndoCommand::SetValue(cmd) => &cmd.node,
            UndoCommand::Action(cmd) => &cmd.node,
        }
    }

    /// The write, if this is a set-value command
    pub fn as_set_value(&self) -> Option<&SetValueCommand> {
        match self {
            UndoCommand::SetValue(cmd) => Some(cmd),
            UndoCommand::Action(_) => None,
        }
    }

    /// The action, if this is an action command
    pub fn as_action(&self) -> Option<&ActionCommand> {
        match self {
            UndoCommand::Action(cmd) => Some(cmd),
            UndoCommand::SetValue(_) => None,
        }
    }

    /// Whether the command was recorded for `node`
    pub fn is_for(&self, node: &NodeRef) -> bool {
        Arc::ptr_eq(self.node(), node)
    }
}
