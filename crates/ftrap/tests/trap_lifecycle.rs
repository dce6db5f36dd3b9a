//! End-to-end trap lifecycle against a minimal auto-focusing engine.
//!
//! The engine here is a stub: it auto-activates once the container node is
//! observed, focuses the first element of the region, and on unbind
//! deactivates and asks the trap to return focus (deferred).

use std::cell::RefCell;
use std::rc::Rc;

use ftrap::activation::ActiveElementSource;
use ftrap::engine::{EngineMount, FocusEngine};
use ftrap::return_focus::ReturnFocusSpec;
use ftrap::trap::{FocusTrap, TrapOptions, TrapState};
use ftrap_core::defer::TaskQueue;
use ftrap_core::event::RelayEvent;
use ftrap_core::identity::TrapId;
use ftrap_core::node::{FocusOptions, NodeRef};
use ftrap_core::probe::ProbeNode;

#[derive(Default)]
struct AutoFocusEngine {
    region: RefCell<Vec<NodeRef>>,
    binding: RefCell<Option<EngineMount>>,
    focus_seen: RefCell<usize>,
    blur_seen: RefCell<usize>,
}

impl AutoFocusEngine {
    fn with_region(region: Vec<NodeRef>) -> Rc<Self> {
        Rc::new(Self {
            region: RefCell::new(region),
            ..Self::default()
        })
    }
}

impl FocusEngine for AutoFocusEngine {
    fn mount(&self, params: EngineMount) {
        let had_node = self
            .binding
            .borrow()
            .as_ref()
            .is_some_and(|m| m.observed.is_some());
        let activate =
            !had_node && params.observed.is_some() && params.auto_focus && !params.disabled;
        *self.binding.borrow_mut() = Some(params.clone());

        if activate {
            (params.on_activation)();
            if let Some(first) = self.region.borrow().first().cloned() {
                first.focus(params.focus_options.as_ref());
            }
        }
    }

    fn unmount(&self, _identity: TrapId) {
        let Some(binding) = self.binding.borrow_mut().take() else {
            return;
        };
        (binding.on_deactivation)();
        (binding.return_focus)(true);
    }

    fn handle_focus(&self, _event: &RelayEvent) {
        *self.focus_seen.borrow_mut() += 1;
    }

    fn handle_blur(&self, _event: &RelayEvent) {
        *self.blur_seen.borrow_mut() += 1;
    }
}

struct Host {
    tasks: TaskQueue,
    doc_focus: Rc<RefCell<Option<NodeRef>>>,
}

impl Host {
    fn new() -> Self {
        Self {
            tasks: TaskQueue::new(),
            doc_focus: Rc::new(RefCell::new(None)),
        }
    }

    fn active_element_source(&self) -> ActiveElementSource {
        let doc_focus = Rc::clone(&self.doc_focus);
        Rc::new(move || doc_focus.borrow().clone())
    }

    fn focus(&self, node: NodeRef) {
        *self.doc_focus.borrow_mut() = Some(node);
    }
}

#[test]
fn auto_focus_then_return_on_unmount() {
    let host = Host::new();

    // A button holds focus before the trap mounts.
    let button = ProbeNode::named("button");
    host.focus(button.handle());

    // The region contains one focusable input.
    let input = ProbeNode::named("input");
    let engine = AutoFocusEngine::with_region(vec![input.handle()]);

    let trap = FocusTrap::new(
        engine,
        host.tasks.clone(),
        host.active_element_source(),
        TrapOptions::new().with_return_focus(ReturnFocusSpec::Always),
    );
    let container = ProbeNode::named("container");
    trap.set_container(Some(container.handle()));

    // Activation focused the input.
    assert_eq!(trap.state(), TrapState::EnabledActive);
    assert_eq!(input.focus_count(), 1);
    assert_eq!(button.focus_count(), 0);

    // Teardown: deactivation plus deferred return focus.
    trap.unmount();
    assert_eq!(trap.state(), TrapState::EnabledInactive);
    assert_eq!(button.focus_count(), 0);

    host.tasks.drain();
    assert_eq!(button.focus_count(), 1);
    assert_eq!(button.last_options(), None);
}

#[test]
fn return_focus_configuration_is_honored_lazily() {
    let host = Host::new();
    let button = ProbeNode::named("button");
    host.focus(button.handle());

    let input = ProbeNode::named("input");
    let engine = AutoFocusEngine::with_region(vec![input.handle()]);

    // Mounted with focus return off.
    let trap = FocusTrap::new(
        engine,
        host.tasks.clone(),
        host.active_element_source(),
        TrapOptions::new(),
    );
    trap.set_container(Some(ProbeNode::named("container").handle()));
    assert_eq!(trap.state(), TrapState::EnabledActive);

    // Caller flips configuration mid-trap; the return spec is read at teardown.
    trap.update(TrapOptions::new().with_return_focus(ReturnFocusSpec::WithOptions(
        FocusOptions::new().with_prevent_scroll(true),
    )));

    trap.unmount();
    host.tasks.drain();
    assert_eq!(button.focus_count(), 1);
    assert_eq!(
        button.last_options(),
        Some(FocusOptions::new().with_prevent_scroll(true))
    );
}

#[test]
fn disabled_trap_never_activates_or_returns() {
    let host = Host::new();
    let button = ProbeNode::named("button");
    host.focus(button.handle());

    let input = ProbeNode::named("input");
    let engine = AutoFocusEngine::with_region(vec![input.handle()]);

    let trap = FocusTrap::new(
        engine,
        host.tasks.clone(),
        host.active_element_source(),
        TrapOptions::new()
            .with_disabled(true)
            .with_return_focus(ReturnFocusSpec::Always),
    );
    trap.set_container(Some(ProbeNode::named("container").handle()));

    assert_eq!(trap.state(), TrapState::Disabled);
    assert_eq!(input.focus_count(), 0);

    trap.unmount();
    host.tasks.drain();
    assert_eq!(button.focus_count(), 0);
}

#[test]
fn original_target_removed_before_deferred_return() {
    let host = Host::new();
    let button = ProbeNode::named("button");
    host.focus(button.handle());

    let input = ProbeNode::named("input");
    let engine = AutoFocusEngine::with_region(vec![input.handle()]);

    let trap = FocusTrap::new(
        engine,
        host.tasks.clone(),
        host.active_element_source(),
        TrapOptions::new().with_return_focus(ReturnFocusSpec::Always),
    );
    trap.set_container(Some(ProbeNode::named("container").handle()));

    trap.unmount();
    // The button leaves the tree while the return is still queued.
    button.detach();
    host.tasks.drain();

    assert_eq!(button.focus_count(), 0);
}

#[test]
fn relayed_events_respect_activation_gating() {
    let host = Host::new();
    let input = ProbeNode::named("input");
    let engine = AutoFocusEngine::with_region(vec![input.handle()]);

    let trap = FocusTrap::new(
        Rc::clone(&engine) as Rc<dyn FocusEngine>,
        host.tasks.clone(),
        host.active_element_source(),
        TrapOptions::new().with_auto_focus(false),
    );
    trap.set_container(Some(ProbeNode::named("container").handle()));

    // Inactive: blur reaches the engine, focus does not.
    let event = RelayEvent::new(Some(input.handle()));
    trap.handle_focus(&event);
    trap.handle_blur(&event);
    assert_eq!(*engine.focus_seen.borrow(), 0);
    assert_eq!(*engine.blur_seen.borrow(), 1);

    // Engine asserts containment; focus now flows through.
    let binding = engine.binding.borrow().clone().expect("engine bound");
    (binding.on_activation)();
    trap.handle_focus(&event);
    assert_eq!(*engine.focus_seen.borrow(), 1);
}
