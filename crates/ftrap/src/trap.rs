#![forbid(unsafe_code)]

//! Trap orchestrator.
//!
//! Composes guards, observation, activation, relay, and return-focus into
//! the externally visible trap, and owns the engine binding.
//!
//! # State machine
//!
//! - **Disabled**: container only; no engine binding mounted; guards stay
//!   in the tree but tab-unreachable.
//! - **Enabled-Inactive**: guards and engine binding mounted, containment
//!   not yet asserted.
//! - **Enabled-Active**: containment asserted.
//!
//! Transitions: the disable flag moves between Disabled and
//! Enabled-Inactive (disabling from any state also clears the pre-trap
//! focus capture); the engine drives Enabled-Inactive ↔ Enabled-Active via
//! the lifecycle callbacks.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use ftrap_core::defer::TaskQueue;
use ftrap_core::event::{RelayEvent, RelayHandler};
use ftrap_core::identity::TrapId;
use ftrap_core::node::{FocusOptions, NodeRef};

use crate::activation::{
    ActivationController, ActivationHook, ActiveElementSource, DeactivationHook,
};
use crate::engine::{AllowList, EngineMount, FocusEngine};
use crate::guard::{FocusGuard, GuardSuppression, guard_rail};
use crate::observation::ObservationHandle;
use crate::relay::FocusEventRelay;
use crate::return_focus::{FocusCapture, ReturnFocusProtocol, ReturnFocusSpec};

/// Container attribute carrying the trap's cooperation group.
pub const FOCUS_GROUP: &str = "data-focus-lock";

/// Container attribute present while the trap is disabled.
pub const FOCUS_DISABLED: &str = "data-focus-lock-disabled";

/// Externally visible trap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapState {
    Disabled,
    EnabledInactive,
    EnabledActive,
}

/// Caller configuration for one trap.
#[derive(Clone, Default)]
pub struct TrapOptions {
    /// Disable containment entirely.
    pub disabled: bool,
    /// Guard rendering policy.
    pub guards: GuardSuppression,
    /// Re-assert focus even on blurs that stay within the document.
    pub persistent_focus: bool,
    /// Enforce containment across nested browsing contexts.
    pub cross_frame: bool,
    /// Focus an element inside the region on activation if none is focused.
    pub auto_focus: bool,
    /// Label partitioning traps that cooperate (nested/sibling traps).
    pub group: Option<String>,
    /// Elements outside the region the engine may still focus.
    pub allow_list: Option<AllowList>,
    /// Auxiliary subtrees treated as part of the region.
    pub shards: Vec<NodeRef>,
    /// Whether/how focus is restored on deactivation.
    pub return_focus: ReturnFocusSpec,
    /// Options for the restoring focus call.
    pub focus_options: Option<FocusOptions>,
    /// Caller lifecycle hooks.
    pub on_activation: Option<ActivationHook>,
    pub on_deactivation: Option<DeactivationHook>,
    /// Caller focus/blur handlers, forwarded before anything else.
    pub on_focus: Option<RelayHandler>,
    pub on_blur: Option<RelayHandler>,
    /// Extra attributes merged onto the container.
    pub lock_props: Vec<(String, String)>,
    /// Deprecated; text selection is always allowed. Warned once.
    pub allow_text_selection: Option<bool>,
}

impl TrapOptions {
    /// Defaults: enabled, guards on, auto-focus on, cross-frame on, focus
    /// never returned.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cross_frame: true,
            auto_focus: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_guards(mut self, guards: GuardSuppression) -> Self {
        self.guards = guards;
        self
    }

    #[must_use]
    pub fn with_persistent_focus(mut self, persistent_focus: bool) -> Self {
        self.persistent_focus = persistent_focus;
        self
    }

    #[must_use]
    pub fn with_cross_frame(mut self, cross_frame: bool) -> Self {
        self.cross_frame = cross_frame;
        self
    }

    #[must_use]
    pub fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = Some(allow_list);
        self
    }

    #[must_use]
    pub fn with_shards(mut self, shards: Vec<NodeRef>) -> Self {
        self.shards = shards;
        self
    }

    #[must_use]
    pub fn with_return_focus(mut self, return_focus: ReturnFocusSpec) -> Self {
        self.return_focus = return_focus;
        self
    }

    #[must_use]
    pub fn with_focus_options(mut self, focus_options: FocusOptions) -> Self {
        self.focus_options = Some(focus_options);
        self
    }

    #[must_use]
    pub fn with_on_activation(mut self, hook: ActivationHook) -> Self {
        self.on_activation = Some(hook);
        self
    }

    #[must_use]
    pub fn with_on_deactivation(mut self, hook: DeactivationHook) -> Self {
        self.on_deactivation = Some(hook);
        self
    }

    #[must_use]
    pub fn with_on_focus(mut self, handler: RelayHandler) -> Self {
        self.on_focus = Some(handler);
        self
    }

    #[must_use]
    pub fn with_on_blur(mut self, handler: RelayHandler) -> Self {
        self.on_blur = Some(handler);
        self
    }

    #[must_use]
    pub fn with_lock_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock_props.push((key.into(), value.into()));
        self
    }
}

/// Derived per-render description of the trap's structural output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapLayout {
    /// Guard placeholders surrounding the region, with reachability.
    pub guards: Vec<FocusGuard>,
    /// Attributes for the protected container.
    pub container_attrs: Vec<(String, String)>,
}

/// The focus trap: composes the lifecycle components and binds the engine.
pub struct FocusTrap {
    identity: TrapId,
    engine: Rc<dyn FocusEngine>,
    observation: Rc<ObservationHandle>,
    activation: Rc<ActivationController>,
    protocol: Rc<ReturnFocusProtocol>,
    relay: FocusEventRelay,
    capture: FocusCapture,
    options: RefCell<TrapOptions>,
    mounted: Cell<bool>,
    warned_text_selection: Cell<bool>,
    // Engine-facing callbacks, created once; engines memoizing on callback
    // identity never re-subscribe for the trap's lifetime.
    on_activation_cb: Rc<dyn Fn()>,
    on_deactivation_cb: Rc<dyn Fn()>,
    return_focus_cb: Rc<dyn Fn(bool)>,
}

impl FocusTrap {
    /// Create a trap bound to an engine, the host task queue, and the
    /// host's active-element source. Mounts the engine binding immediately
    /// unless disabled.
    #[must_use]
    pub fn new(
        engine: Rc<dyn FocusEngine>,
        tasks: TaskQueue,
        active_element: ActiveElementSource,
        options: TrapOptions,
    ) -> Rc<Self> {
        let identity = TrapId::mint();
        let observation = Rc::new(ObservationHandle::new());
        let capture = FocusCapture::new();
        let protocol = Rc::new(ReturnFocusProtocol::new(capture.clone(), tasks));
        let activation = Rc::new(ActivationController::new(
            capture.clone(),
            Rc::clone(&observation),
            active_element,
        ));
        let relay = FocusEventRelay::new(activation.state(), Rc::clone(&engine));

        activation.set_hooks(options.on_activation.clone(), options.on_deactivation.clone());
        relay.set_handlers(options.on_focus.clone(), options.on_blur.clone());
        protocol.set_spec(options.return_focus.clone());

        let on_activation_cb: Rc<dyn Fn()> = {
            let activation = Rc::clone(&activation);
            Rc::new(move || {
                tracing::debug!(target: "ftrap.trap", trap = identity.as_u64(), "activated");
                activation.on_activation();
            })
        };
        let on_deactivation_cb: Rc<dyn Fn()> = {
            let activation = Rc::clone(&activation);
            Rc::new(move || {
                tracing::debug!(target: "ftrap.trap", trap = identity.as_u64(), "deactivated");
                activation.on_deactivation();
            })
        };
        let return_focus_cb: Rc<dyn Fn(bool)> = {
            let protocol = Rc::clone(&protocol);
            Rc::new(move |allow_defer| protocol.return_focus(allow_defer))
        };

        let disabled = options.disabled;
        let trap = Rc::new(Self {
            identity,
            engine,
            observation,
            activation,
            protocol,
            relay,
            capture,
            options: RefCell::new(options),
            mounted: Cell::new(false),
            warned_text_selection: Cell::new(false),
            on_activation_cb,
            on_deactivation_cb,
            return_focus_cb,
        });

        // Re-publish the engine binding whenever the container changes
        // identity; the engine holds only a non-owning view of the node.
        {
            let weak: Weak<Self> = Rc::downgrade(&trap);
            trap.observation
                .set_internal_subscriber(Rc::new(move |_node| {
                    if let Some(trap) = weak.upgrade() {
                        trap.republish();
                    }
                }));
        }

        trap.warn_deprecated();
        if !disabled {
            trap.mounted.set(true);
            trap.republish();
        }
        trap
    }

    /// The trap's process-unique identity.
    #[must_use]
    pub fn identity(&self) -> TrapId {
        self.identity
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TrapState {
        if self.options.borrow().disabled {
            TrapState::Disabled
        } else if self.activation.state().is_active() {
            TrapState::EnabledActive
        } else {
            TrapState::EnabledInactive
        }
    }

    /// Whether containment is currently asserted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.activation.state().is_active()
    }

    /// The observed container node, if attached.
    #[must_use]
    pub fn observed(&self) -> Option<NodeRef> {
        self.observation.observed()
    }

    /// Attach, replace, or detach (`None`) the container node. The merged
    /// ref entry point: identity-unchanged nodes are a no-op.
    pub fn set_container(&self, node: Option<NodeRef>) {
        self.observation.set_observe_node(node);
    }

    /// Register a caller ref forwarder that mirrors every container change.
    pub fn set_ref_forwarder(&self, forwarder: Rc<dyn Fn(Option<&NodeRef>)>) {
        self.observation.set_external_forwarder(forwarder);
    }

    /// A focus event reached the container.
    pub fn handle_focus(&self, event: &RelayEvent) {
        self.relay.handle_focus(event);
    }

    /// A blur event reached the container.
    pub fn handle_blur(&self, event: &RelayEvent) {
        self.relay.handle_blur(event);
    }

    /// Restore focus per the configured spec. Normally driven by the
    /// engine through the published callback.
    pub fn return_focus(&self, allow_defer: bool) {
        self.protocol.return_focus(allow_defer);
    }

    /// Replace the caller configuration. Handler slots are swapped only on
    /// identity change; the return-focus spec is honored lazily at
    /// deactivation time.
    pub fn update(&self, options: TrapOptions) {
        self.activation
            .set_hooks(options.on_activation.clone(), options.on_deactivation.clone());
        self.relay
            .set_handlers(options.on_focus.clone(), options.on_blur.clone());
        self.protocol.set_spec(options.return_focus.clone());

        let was_disabled = self.options.borrow().disabled;
        let now_disabled = options.disabled;
        let config_changed = !same_mount_config(&self.options.borrow(), &options);
        *self.options.borrow_mut() = options;
        self.warn_deprecated();

        if was_disabled == now_disabled {
            // Engines may rebuild bookkeeping per publish; only an actual
            // change in what the mount carries warrants one.
            if config_changed {
                self.republish();
            }
        } else if now_disabled {
            self.suspend();
        } else {
            self.mounted.set(true);
            self.republish();
        }
    }

    /// Flip only the disable flag.
    pub fn set_disabled(&self, disabled: bool) {
        if self.options.borrow().disabled == disabled {
            return;
        }
        let options = {
            let mut options = self.options.borrow().clone();
            options.disabled = disabled;
            options
        };
        self.update(options);
    }

    /// The trap is going away: unbind the engine, detach the container,
    /// and drop any pending capture.
    pub fn unmount(&self) {
        if self.mounted.replace(false) {
            // The engine deactivates and runs the return-focus callback
            // (deferred) as part of unbinding.
            self.engine.unmount(self.identity);
        }
        // Passive engines leave the flag up; end containment regardless.
        if self.activation.state().is_active() {
            self.activation.on_deactivation();
        }
        self.observation.set_observe_node(None);
        self.capture.clear();
    }

    /// Derive the structural output for one render pass.
    #[must_use]
    pub fn layout(&self) -> TrapLayout {
        let options = self.options.borrow();
        let guards = guard_rail(options.disabled, options.guards);

        let mut container_attrs = Vec::new();
        if options.disabled {
            container_attrs.push((FOCUS_DISABLED.to_string(), "disabled".to_string()));
        }
        if let Some(group) = &options.group {
            container_attrs.push((FOCUS_GROUP.to_string(), group.clone()));
        }
        container_attrs.extend(options.lock_props.iter().cloned());

        TrapLayout {
            guards,
            container_attrs,
        }
    }

    fn suspend(&self) {
        if self.mounted.replace(false) {
            self.engine.unmount(self.identity);
        }
        // An engine may drop its bookkeeping on unmount without driving the
        // deactivation callback; containment must still end here, or a
        // re-enable would report active with no activation having occurred.
        if self.activation.state().is_active() {
            self.activation.on_deactivation();
        }
        // A stale capture must not leak across a future re-enable.
        self.capture.clear();
    }

    fn republish(&self) {
        if !self.mounted.get() {
            return;
        }
        let params = self.engine_mount();
        self.engine.mount(params);
    }

    fn engine_mount(&self) -> EngineMount {
        let options = self.options.borrow();
        EngineMount {
            identity: self.identity,
            observed: self.observation.observed(),
            disabled: options.disabled,
            persistent_focus: options.persistent_focus,
            cross_frame: options.cross_frame,
            auto_focus: options.auto_focus,
            allow_list: options.allow_list.clone(),
            shards: options.shards.clone(),
            on_activation: Rc::clone(&self.on_activation_cb),
            on_deactivation: Rc::clone(&self.on_deactivation_cb),
            return_focus: Rc::clone(&self.return_focus_cb),
            focus_options: options.focus_options,
        }
    }

    fn warn_deprecated(&self) {
        if self.options.borrow().allow_text_selection.is_some()
            && !self.warned_text_selection.replace(true)
        {
            tracing::warn!(
                target: "ftrap.trap",
                trap = self.identity.as_u64(),
                "allow_text_selection is deprecated and enabled by default"
            );
        }
    }
}

/// Whether two option sets publish identical engine mounts. The observed
/// node and the lifecycle callbacks do not vary with options, so they are
/// not part of the comparison. Disabled is handled by the caller.
fn same_mount_config(a: &TrapOptions, b: &TrapOptions) -> bool {
    a.persistent_focus == b.persistent_focus
        && a.cross_frame == b.cross_frame
        && a.auto_focus == b.auto_focus
        && a.focus_options == b.focus_options
        && crate::same_callback(a.allow_list.as_ref(), b.allow_list.as_ref())
        && a.shards.len() == b.shards.len()
        && a.shards.iter().zip(&b.shards).all(|(x, y)| Rc::ptr_eq(x, y))
}

// =========================================================================
// Tests
// =========================================================================
