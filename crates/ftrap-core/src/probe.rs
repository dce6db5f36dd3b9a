#![forbid(unsafe_code)]

//! Instrumented focusable node for deterministic tests.
//!
//! Available to downstream crates via the `test-helpers` feature.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::node::{FocusOptions, Focusable, NodeRef};

/// A focusable node that records every focus call made against it.
#[derive(Debug)]
pub struct ProbeNode {
    name: &'static str,
    focusable: Cell<bool>,
    focus_count: Cell<usize>,
    last_options: RefCell<Option<FocusOptions>>,
}

impl ProbeNode {
    /// Create a focusable probe with a diagnostic name.
    #[must_use]
    pub fn named(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            focusable: Cell::new(true),
            focus_count: Cell::new(0),
            last_options: RefCell::new(None),
        })
    }

    /// The diagnostic name given at construction.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Coerce to the trait-object handle the trap operates on.
    #[must_use]
    pub fn handle(self: &Rc<Self>) -> NodeRef {
        Rc::clone(self) as NodeRef
    }

    /// Simulate removal from the host tree: further focus calls no-op.
    pub fn detach(&self) {
        self.focusable.set(false);
    }

    /// Re-attach a previously detached probe.
    pub fn attach(&self) {
        self.focusable.set(true);
    }

    /// Number of successful focus calls received.
    #[must_use]
    pub fn focus_count(&self) -> usize {
        self.focus_count.get()
    }

    /// Options carried by the most recent successful focus call.
    #[must_use]
    pub fn last_options(&self) -> Option<FocusOptions> {
        *self.last_options.borrow()
    }
}

impl Focusable for ProbeNode {
    fn focus(&self, options: Option<&FocusOptions>) -> bool {
        if !self.focusable.get() {
            return false;
        }
        self.focus_count.set(self.focus_count.get() + 1);
        *self.last_options.borrow_mut() = options.copied();
        true
    }

    fn is_focusable(&self) -> bool {
        self.focusable.get()
    }
}
