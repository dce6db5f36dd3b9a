#![forbid(unsafe_code)]

//! Consumed interface of the external focus engine.
//!
//! The engine owns everything this crate deliberately does not: tab-order
//! computation, focusability testing, cross-frame transfer. The trap only
//! publishes its configuration and callbacks through [`EngineMount`] and
//! forwards relayed focus/blur events into the engine's channels.
//!
//! An engine serving several mounted traps is expected to serialize its own
//! bookkeeping keyed by [`TrapId`].

use std::rc::Rc;

use ftrap_core::event::RelayEvent;
use ftrap_core::identity::TrapId;
use ftrap_core::node::{FocusOptions, NodeRef};

/// Predicate restricting which elements outside the region the engine may
/// still treat as valid focus targets (e.g. portaled content).
pub type AllowList = Rc<dyn Fn(&NodeRef) -> bool>;

/// Everything a trap publishes to the engine on mount and on every
/// configuration or observed-node change.
#[derive(Clone)]
pub struct EngineMount {
    /// Distinguishes concurrently mounted traps. Immutable per trap.
    pub identity: TrapId,
    /// Root node of the protected region, when the container has attached.
    pub observed: Option<NodeRef>,
    pub disabled: bool,
    /// Re-assert focus into the region even on blurs that stay within the
    /// document.
    pub persistent_focus: bool,
    /// Enforce containment across nested browsing contexts.
    pub cross_frame: bool,
    /// Focus an element inside the region on activation if none is focused.
    pub auto_focus: bool,
    /// Absent means no exceptions outside the region.
    pub allow_list: Option<AllowList>,
    /// Ordered auxiliary subtrees treated as part of the region.
    pub shards: Vec<NodeRef>,
    /// Lifecycle callbacks; referentially stable for the trap's lifetime.
    pub on_activation: Rc<dyn Fn()>,
    pub on_deactivation: Rc<dyn Fn()>,
    /// Invoked by the engine on teardown; the argument allows deferral.
    pub return_focus: Rc<dyn Fn(bool)>,
    /// Options for the final restoring focus call.
    pub focus_options: Option<FocusOptions>,
}

/// External focus-redirection engine, consumed at its interface boundary.
pub trait FocusEngine {
    /// Publish (or re-publish) a trap's configuration.
    fn mount(&self, params: EngineMount);

    /// The trap identified by `identity` is going away.
    ///
    /// Engines typically deactivate and invoke the published return-focus
    /// callback here, but are not required to: the trap ends containment
    /// itself when an unmount leaves the activation flag up.
    fn unmount(&self, identity: TrapId);

    /// Focus channel; the relay forwards here only while the trap is
    /// active.
    fn handle_focus(&self, event: &RelayEvent);

    /// Blur channel; the relay forwards here unconditionally so the engine
    /// can detect focus leaving the document during teardown.
    fn handle_blur(&self, event: &RelayEvent);
}
