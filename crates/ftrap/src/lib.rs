#![forbid(unsafe_code)]

//! Focus trap lifecycle controller.
//!
//! # Role
//! While a trap is active, keyboard and assistive-technology focus is
//! constrained to a bounded region of the host UI tree; on deactivation
//! focus returns to the element that held it before the trap first
//! activated. This crate owns that lifecycle: activation/deactivation
//! bookkeeping, guard placement at the region boundaries, the return-focus
//! protocol, and the relay of focus/blur events to the engine.
//!
//! # Primary responsibilities
//! - **FocusTrap**: the orchestrator composing guards, observation,
//!   activation, relay, and engine binding.
//! - **ActivationController**: containment state and pre-trap focus capture.
//! - **ReturnFocusProtocol**: whether, where, and when focus is restored.
//! - **FocusEventRelay**: caller-first forwarding of focus/blur events.
//! - **FocusEngine**: the consumed interface of the external engine that
//!   performs actual tab-order computation and focus redirection.
//!
//! # What lives elsewhere
//! Discovering and ranking focusable elements, cross-frame transfer, and
//! rendering of the protected region are engine and host concerns. This
//! crate ships no engine implementation.

pub mod activation;
pub mod engine;
pub mod guard;
pub mod observation;
pub mod relay;
pub mod return_focus;
pub mod trap;

pub use activation::{ActivationController, ActivationState};
pub use engine::{EngineMount, FocusEngine};
pub use guard::{FocusGuard, GuardEdge, GuardSuppression};
pub use observation::ObservationHandle;
pub use relay::FocusEventRelay;
pub use return_focus::{FocusCapture, ReturnDecision, ReturnFocusProtocol, ReturnFocusSpec};
pub use trap::{FocusTrap, TrapLayout, TrapOptions, TrapState};

use std::rc::Rc;

/// Compare two optional shared callbacks by reference identity.
///
/// Used as the dirty check before replacing a stored handler, so engine
/// subscriptions keyed on callback identity do not thrash.
pub(crate) fn same_callback<T: ?Sized>(a: Option<&Rc<T>>, b: Option<&Rc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}
