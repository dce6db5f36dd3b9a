#![forbid(unsafe_code)]

//! Relay event payloads.
//!
//! Focus and blur notifications bubbling through a trap's container are
//! wrapped in [`RelayEvent`] before being forwarded to caller handlers and
//! to the engine channels.

use std::fmt;
use std::rc::Rc;

use crate::node::{NodeRef, same_node};

/// Payload for a focus or blur notification.
#[derive(Clone, Default)]
pub struct RelayEvent {
    /// The node the event targeted, when the host can identify one.
    pub target: Option<NodeRef>,
}

impl RelayEvent {
    /// Create an event for the given target.
    #[must_use]
    pub fn new(target: Option<NodeRef>) -> Self {
        Self { target }
    }

    /// Whether this event targets the given node.
    #[must_use]
    pub fn targets(&self, node: &NodeRef) -> bool {
        same_node(self.target.as_ref(), Some(node))
    }
}

impl fmt::Debug for RelayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayEvent")
            .field("target", &self.target.as_ref().map(|_| "<node>"))
            .finish()
    }
}

/// Caller-supplied handler invoked for every relayed event.
pub type RelayHandler = Rc<dyn Fn(&RelayEvent)>;
