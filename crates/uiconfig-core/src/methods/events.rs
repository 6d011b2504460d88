// # Change Events
//
// Payload delivered to `onChange` listeners, and the props callers use to
// shape it.

use crate::node::NodeRef;
use crate::value::Value;

/// Props accepted by writes and change dispatches
///
/// Only `last` is normally set by callers. `config` and `config_path` carry
/// the origin of an event bubbling up from a child; `last_value` may be
/// supplied when the caller already holds the exact (uncloned) bound value.
#[derive(Clone, Debug, Default)]
pub struct ChangeProps {
    /// Whether this is the final change of a burst; defaults to `true`
    pub last: Option<bool>,
    /// Node the change originated from
    pub config: Option<NodeRef>,
    /// Path from the originating node up to (not including) the dispatching node
    pub config_path: Vec<NodeRef>,
    /// New value
    pub value: Option<Value>,
    /// Value before the change
    pub last_value: Option<Value>,
}

impl ChangeProps {
    /// Props with only `last` set
    pub fn last(last: bool) -> Self {
        Self {
            last: Some(last),
            ..Self::default()
        }
    }

    /// Set the known previous value
    pub fn with_last_value(mut self, value: impl Into<Value>) -> Self {
        self.last_value = Some(value.into());
        self
    }
}

/// A change notification
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    /// Whether this is the final change of a burst
    pub last: bool,
    /// Node the change originated from
    pub config: NodeRef,
    /// Nodes from the dispatching node down to the originating node
    pub config_path: Vec<NodeRef>,
    /// Node currently dispatching the event
    pub target: NodeRef,
    /// New value (absent for clicks)
    pub value: Option<Value>,
    /// Value before the change
    pub last_value: Option<Value>,
}

impl ChangeEvent {
    /// Props that re-dispatch this event from a parent node
    pub fn bubble(&self) -> ChangeProps {
        ChangeProps {
            last: Some(self.last),
            config: Some(self.config.clone()),
            config_path: self.config_path.clone(),
            value: self.value.clone(),
            last_value: self.last_value.clone(),
        }
    }
}
