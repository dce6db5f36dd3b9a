#![forbid(unsafe_code)]

//! Containment state and pre-trap focus capture.
//!
//! The engine drives the two lifecycle callbacks; this controller owns the
//! activation flag and performs the capture of the element focused before
//! the trap first activated.
//!
//! # Invariants
//!
//! 1. **Idempotent activation**: repeated `on_activation` calls without an
//!    intervening deactivation never move the capture.
//! 2. **Teardown ordering**: `on_deactivation` clears the active flag
//!    *before* the caller hook runs, so focus events arriving during
//!    teardown are no longer forwarded to the engine.
//! 3. Caller hook faults are not caught here; they propagate to the host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ftrap_core::node::NodeRef;

use crate::observation::ObservationHandle;
use crate::return_focus::FocusCapture;
use crate::same_callback;

/// Caller hook invoked when containment starts, with the observed node.
pub type ActivationHook = Rc<dyn Fn(&NodeRef)>;

/// Caller hook invoked when containment stops.
pub type DeactivationHook = Rc<dyn Fn(Option<&NodeRef>)>;

/// Source of the host's currently focused element (the `document` side of
/// the capture, injected so the controller stays host-agnostic).
pub type ActiveElementSource = Rc<dyn Fn() -> Option<NodeRef>>;

/// Read handle on the two-valued containment flag.
///
/// Writable only by [`ActivationController`]; the relay holds a clone for
/// reading.
#[derive(Clone, Default)]
pub struct ActivationState {
    active: Rc<Cell<bool>>,
}

impl ActivationState {
    /// Whether containment is currently asserted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    fn set(&self, active: bool) {
        self.active.set(active);
    }
}

/// Tracks containment and remembers the pre-trap focus target.
pub struct ActivationController {
    state: ActivationState,
    capture: FocusCapture,
    observation: Rc<ObservationHandle>,
    active_element: ActiveElementSource,
    on_activation_hook: RefCell<Option<ActivationHook>>,
    on_deactivation_hook: RefCell<Option<DeactivationHook>>,
    missing_node_reported: Cell<bool>,
}

impl ActivationController {
    /// Wire a controller to its capture slot, observation handle, and the
    /// host's active-element source.
    #[must_use]
    pub fn new(
        capture: FocusCapture,
        observation: Rc<ObservationHandle>,
        active_element: ActiveElementSource,
    ) -> Self {
        Self {
            state: ActivationState::default(),
            capture,
            observation,
            active_element,
            on_activation_hook: RefCell::new(None),
            on_deactivation_hook: RefCell::new(None),
            missing_node_reported: Cell::new(false),
        }
    }

    /// A read handle on the containment flag.
    #[must_use]
    pub fn state(&self) -> ActivationState {
        self.state.clone()
    }

    /// Replace the caller hooks, only when their identity actually changed.
    pub fn set_hooks(
        &self,
        on_activation: Option<ActivationHook>,
        on_deactivation: Option<DeactivationHook>,
    ) {
        if !same_callback(
            self.on_activation_hook.borrow().as_ref(),
            on_activation.as_ref(),
        ) {
            *self.on_activation_hook.borrow_mut() = on_activation;
        }
        if !same_callback(
            self.on_deactivation_hook.borrow().as_ref(),
            on_deactivation.as_ref(),
        ) {
            *self.on_deactivation_hook.borrow_mut() = on_deactivation;
        }
    }

    /// Containment started. Safe to call repeatedly while already active.
    pub fn on_activation(&self) {
        self.capture.capture_if_unset((self.active_element)());

        match self.observation.observed() {
            Some(observed) => {
                let hook = self.on_activation_hook.borrow().clone();
                if let Some(hook) = hook {
                    hook(&observed);
                }
            }
            None => {
                // The trap degrades to a no-op; diagnostic only, once.
                if !self.missing_node_reported.replace(true) {
                    tracing::error!(
                        target: "ftrap.activation",
                        "focus trap could not obtain a container node"
                    );
                }
            }
        }

        self.state.set(true);
    }

    /// Containment stopped. The flag drops before the caller hook runs.
    pub fn on_deactivation(&self) {
        self.state.set(false);

        let hook = self.on_deactivation_hook.borrow().clone();
        if let Some(hook) = hook {
            hook(self.observation.observed().as_ref());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
