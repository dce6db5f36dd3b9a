#![forbid(unsafe_code)]

//! Stable reference to the protected region's root node.
//!
//! One owned mutable slot, written only on actual node-identity change.
//! Two kinds of subscribers read it: the caller's external ref forwarder
//! (so trap consumers can still obtain a direct handle to the container)
//! and the internal subscriber (the orchestrator republishing the engine
//! mount). Single writer, multiple readers; no subscriber ever holds an
//! independently writable handle.

use std::cell::RefCell;
use std::rc::Rc;

use ftrap_core::node::{NodeRef, same_node};

type NodeSubscriber = Rc<dyn Fn(Option<&NodeRef>)>;

/// Owned slot for the observed container node.
#[derive(Default)]
pub struct ObservationHandle {
    observed: RefCell<Option<NodeRef>>,
    external: RefCell<Option<NodeSubscriber>>,
    internal: RefCell<Option<NodeSubscriber>>,
}

impl ObservationHandle {
    /// Create an empty handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently observed node, if any.
    #[must_use]
    pub fn observed(&self) -> Option<NodeRef> {
        self.observed.borrow().clone()
    }

    /// Register the caller's ref forwarder (merged external ref).
    ///
    /// The forwarder is invoked immediately with the current node so a
    /// late-registered consumer does not miss the value.
    pub fn set_external_forwarder(&self, forwarder: NodeSubscriber) {
        forwarder(self.observed.borrow().as_ref());
        *self.external.borrow_mut() = Some(forwarder);
    }

    /// Register the internal subscriber (engine republish).
    pub(crate) fn set_internal_subscriber(&self, subscriber: NodeSubscriber) {
        *self.internal.borrow_mut() = Some(subscriber);
    }

    /// Store a new observed node.
    ///
    /// Identity-compares against the current node; an unchanged node is a
    /// no-op so downstream subscribers see no redundant notifications.
    /// Returns whether the node actually changed.
    pub fn set_observe_node(&self, node: Option<NodeRef>) -> bool {
        if same_node(self.observed.borrow().as_ref(), node.as_ref()) {
            return false;
        }
        *self.observed.borrow_mut() = node;

        // Both refs stay in sync on every change: caller first, then engine.
        // The slot borrow is released before subscribers run; they may
        // re-read it.
        let current = self.observed.borrow().clone();
        let external = self.external.borrow().clone();
        if let Some(forwarder) = external {
            forwarder(current.as_ref());
        }
        let internal = self.internal.borrow().clone();
        if let Some(subscriber) = internal {
            subscriber(current.as_ref());
        }
        true
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ftrap_core::probe::ProbeNode;
    use std::cell::Cell;

    #[test]
    fn stores_and_returns_node() {
        let handle = ObservationHandle::new();
        assert!(handle.observed().is_none());

        let node = ProbeNode::named("container").handle();
        assert!(handle.set_observe_node(Some(node.clone())));
        assert!(same_node(handle.observed().as_ref(), Some(&node)));
    }

    #[test]
    fn unchanged_node_is_noop() {
        let handle = ObservationHandle::new();
        let node = ProbeNode::named("container").handle();

        let notifications = Rc::new(Cell::new(0));
        {
            let notifications = Rc::clone(&notifications);
            handle.set_external_forwarder(Rc::new(move |_| {
                notifications.set(notifications.get() + 1);
            }));
        }
        let initial = notifications.get();

        assert!(handle.set_observe_node(Some(node.clone())));
        assert!(!handle.set_observe_node(Some(node)));
        assert_eq!(notifications.get(), initial + 1);
    }

    #[test]
    fn none_to_none_is_noop() {
        let handle = ObservationHandle::new();
        assert!(!handle.set_observe_node(None));
    }

    #[test]
    fn change_notifies_external_and_internal() {
        let handle = ObservationHandle::new();
        let external_seen = Rc::new(Cell::new(false));
        let internal_seen = Rc::new(Cell::new(false));

        {
            let seen = Rc::clone(&external_seen);
            handle.set_external_forwarder(Rc::new(move |node| {
                seen.set(node.is_some());
            }));
        }
        {
            let seen = Rc::clone(&internal_seen);
            handle.set_internal_subscriber(Rc::new(move |node| {
                seen.set(node.is_some());
            }));
        }

        handle.set_observe_node(Some(ProbeNode::named("container").handle()));
        assert!(external_seen.get());
        assert!(internal_seen.get());

        handle.set_observe_node(None);
        assert!(!external_seen.get());
        assert!(!internal_seen.get());
    }

    #[test]
    fn late_forwarder_receives_current_node() {
        let handle = ObservationHandle::new();
        let node = ProbeNode::named("container").handle();
        handle.set_observe_node(Some(node));

        let seen = Rc::new(Cell::new(false));
        {
            let seen = Rc::clone(&seen);
            handle.set_external_forwarder(Rc::new(move |node| {
                seen.set(node.is_some());
            }));
        }
        assert!(seen.get());
    }

    #[test]
    fn unmount_clears_to_none() {
        let handle = ObservationHandle::new();
        let node = ProbeNode::named("container").handle();
        handle.set_observe_node(Some(node));
        assert!(handle.set_observe_node(None));
        assert!(handle.observed().is_none());
    }
}
