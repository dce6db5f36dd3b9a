#![forbid(unsafe_code)]

//! Return-focus protocol.
//!
//! Owns the pre-trap focus capture and decides, at deactivation time,
//! whether, to what element, and with what timing focus is restored.
//!
//! # Invariants
//!
//! 1. **Capture once**: the capture slot, once set, is never overwritten
//!    while non-empty. Repeated activations keep the *original* pre-trap
//!    target.
//! 2. **No double return**: the slot is cleared before the focus call, so
//!    a second `return_focus` is a no-op.
//! 3. **Lazy decision**: the configured spec is evaluated when
//!    `return_focus` runs, not when the trap activates, so configuration
//!    changes mid-trap are honored.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ftrap_core::defer::TaskQueue;
use ftrap_core::node::{FocusOptions, NodeRef};

/// Shared slot holding the element focused before the trap first activated.
#[derive(Clone, Default)]
pub struct FocusCapture {
    slot: Rc<RefCell<Option<NodeRef>>>,
}

impl FocusCapture {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a candidate only when the slot is empty.
    pub fn capture_if_unset(&self, node: Option<NodeRef>) {
        let mut slot = self.slot.borrow_mut();
        if slot.is_none() {
            *slot = node;
        }
    }

    /// The captured node, if any.
    #[must_use]
    pub fn get(&self) -> Option<NodeRef> {
        self.slot.borrow().clone()
    }

    /// Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }

    /// Reset the slot. Used after a successful return and on disable or
    /// unmount cleanup, so a later re-enable captures fresh.
    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

impl fmt::Debug for FocusCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusCapture")
            .field("captured", &!self.is_empty())
            .finish()
    }
}

/// Concrete outcome of evaluating a [`ReturnFocusSpec`] for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDecision {
    /// Do not restore focus.
    Skip,
    /// Restore focus with default options.
    Restore,
    /// Restore focus with the given options.
    RestoreWith(FocusOptions),
}

/// Caller configuration for focus restoration.
#[derive(Clone, Default)]
pub enum ReturnFocusSpec {
    /// Never return focus.
    #[default]
    Never,
    /// Return focus with default options.
    Always,
    /// Return focus with these options.
    WithOptions(FocusOptions),
    /// Ask the caller, per target, at deactivation time.
    Decide(Rc<dyn Fn(&NodeRef) -> ReturnDecision>),
}

impl ReturnFocusSpec {
    fn decide(&self, target: &NodeRef) -> ReturnDecision {
        match self {
            Self::Never => ReturnDecision::Skip,
            Self::Always => ReturnDecision::Restore,
            Self::WithOptions(options) => ReturnDecision::RestoreWith(*options),
            Self::Decide(decide) => decide(target),
        }
    }
}

impl fmt::Debug for ReturnFocusSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Always => f.write_str("Always"),
            Self::WithOptions(options) => f.debug_tuple("WithOptions").field(options).finish(),
            Self::Decide(_) => f.write_str("Decide(..)"),
        }
    }
}

/// Restores focus to the captured pre-trap element on teardown.
pub struct ReturnFocusProtocol {
    capture: FocusCapture,
    spec: RefCell<ReturnFocusSpec>,
    tasks: TaskQueue,
}

impl ReturnFocusProtocol {
    /// Create a protocol around a capture slot and the host task queue.
    #[must_use]
    pub fn new(capture: FocusCapture, tasks: TaskQueue) -> Self {
        Self {
            capture,
            spec: RefCell::new(ReturnFocusSpec::default()),
            tasks,
        }
    }

    /// A shared handle to the capture slot.
    #[must_use]
    pub fn capture(&self) -> FocusCapture {
        self.capture.clone()
    }

    /// Replace the configured spec. Takes effect on the next
    /// `return_focus`, never retroactively.
    pub fn set_spec(&self, spec: ReturnFocusSpec) {
        *self.spec.borrow_mut() = spec;
    }

    /// Restore focus to the captured element, if configuration allows.
    ///
    /// With `allow_defer` the focus call is scheduled on the task queue and
    /// runs after the current synchronous turn, avoiding a race with a
    /// concurrent render pass that may itself move focus. A target removed
    /// from the tree by the time the deferred call runs is a silent no-op.
    pub fn return_focus(&self, allow_defer: bool) {
        let Some(target) = self.capture.get() else {
            return;
        };
        if !target.is_focusable() {
            return;
        }

        // Clone out of the cell: the decision closure may reconfigure us.
        let spec = self.spec.borrow().clone();
        let options = match spec.decide(&target) {
            // Capture retained: a later call may still resolve truthy.
            ReturnDecision::Skip => return,
            ReturnDecision::Restore => None,
            ReturnDecision::RestoreWith(options) => Some(options),
        };

        // Clear before focusing to rule out a double return.
        self.capture.clear();

        if allow_defer {
            tracing::trace!(target: "ftrap.return", "return focus deferred");
            self.tasks.schedule(move || {
                let _ = target.focus(options.as_ref());
            });
        } else {
            let _ = target.focus(options.as_ref());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
