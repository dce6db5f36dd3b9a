#![forbid(unsafe_code)]

//! Focus/blur event relay.
//!
//! Events bubbling through the trap container are forwarded to the
//! caller's own handlers first, unconditionally, preserving the
//! container's normal event contract. The engine sees focus events only
//! while containment is active; blur events always, since focus leaving
//! the document must be observable mid-teardown.

use std::cell::RefCell;
use std::rc::Rc;

use ftrap_core::event::{RelayEvent, RelayHandler};

use crate::activation::ActivationState;
use crate::engine::FocusEngine;
use crate::same_callback;

/// Forwards container focus/blur events to caller handlers and the engine.
pub struct FocusEventRelay {
    state: ActivationState,
    engine: Rc<dyn FocusEngine>,
    on_focus: RefCell<Option<RelayHandler>>,
    on_blur: RefCell<Option<RelayHandler>>,
}

impl FocusEventRelay {
    /// Wire the relay to the containment flag and the engine channels.
    #[must_use]
    pub fn new(state: ActivationState, engine: Rc<dyn FocusEngine>) -> Self {
        Self {
            state,
            engine,
            on_focus: RefCell::new(None),
            on_blur: RefCell::new(None),
        }
    }

    /// Replace the caller handlers, only when their identity changed.
    pub fn set_handlers(&self, on_focus: Option<RelayHandler>, on_blur: Option<RelayHandler>) {
        if !same_callback(self.on_focus.borrow().as_ref(), on_focus.as_ref()) {
            *self.on_focus.borrow_mut() = on_focus;
        }
        if !same_callback(self.on_blur.borrow().as_ref(), on_blur.as_ref()) {
            *self.on_blur.borrow_mut() = on_blur;
        }
    }

    /// A focus event reached the container.
    pub fn handle_focus(&self, event: &RelayEvent) {
        let handler = self.on_focus.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
        if self.state.is_active() {
            self.engine.handle_focus(event);
        }
    }

    /// A blur event reached the container.
    pub fn handle_blur(&self, event: &RelayEvent) {
        let handler = self.on_blur.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
        self.engine.handle_blur(event);
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{ActivationController, ActiveElementSource};
    use crate::observation::ObservationHandle;
    use crate::return_focus::FocusCapture;
    use ftrap_core::identity::TrapId;
    use ftrap_core::probe::ProbeNode;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingEngine {
        focus_seen: Cell<usize>,
        blur_seen: Cell<usize>,
    }

    impl FocusEngine for CountingEngine {
        fn mount(&self, _params: crate::engine::EngineMount) {}
        fn unmount(&self, _identity: TrapId) {}
        fn handle_focus(&self, _event: &RelayEvent) {
            self.focus_seen.set(self.focus_seen.get() + 1);
        }
        fn handle_blur(&self, _event: &RelayEvent) {
            self.blur_seen.set(self.blur_seen.get() + 1);
        }
    }

    struct Fixture {
        relay: FocusEventRelay,
        engine: Rc<CountingEngine>,
        controller: ActivationController,
    }

    fn fixture() -> Fixture {
        let engine = Rc::new(CountingEngine::default());
        let source: ActiveElementSource = Rc::new(|| None);
        let controller = ActivationController::new(
            FocusCapture::new(),
            Rc::new(ObservationHandle::new()),
            source,
        );
        let relay = FocusEventRelay::new(controller.state(), Rc::clone(&engine) as Rc<dyn FocusEngine>);
        Fixture {
            relay,
            engine,
            controller,
        }
    }

    fn event() -> RelayEvent {
        RelayEvent::new(Some(ProbeNode::named("child").handle()))
    }

    // --- Engine gating ---

    #[test]
    fn focus_reaches_engine_only_while_active() {
        let fx = fixture();

        fx.relay.handle_focus(&event());
        assert_eq!(fx.engine.focus_seen.get(), 0);

        fx.controller.on_activation();
        fx.relay.handle_focus(&event());
        assert_eq!(fx.engine.focus_seen.get(), 1);

        fx.controller.on_deactivation();
        fx.relay.handle_focus(&event());
        assert_eq!(fx.engine.focus_seen.get(), 1);
    }

    #[test]
    fn blur_always_reaches_engine() {
        let fx = fixture();

        fx.relay.handle_blur(&event());
        assert_eq!(fx.engine.blur_seen.get(), 1);

        fx.controller.on_activation();
        fx.relay.handle_blur(&event());
        assert_eq!(fx.engine.blur_seen.get(), 2);

        fx.controller.on_deactivation();
        fx.relay.handle_blur(&event());
        assert_eq!(fx.engine.blur_seen.get(), 3);
    }

    // --- Caller handlers ---

    #[test]
    fn caller_handlers_run_regardless_of_state() {
        let fx = fixture();
        let focus_calls = Rc::new(Cell::new(0));
        let blur_calls = Rc::new(Cell::new(0));
        {
            let focus_calls = Rc::clone(&focus_calls);
            let blur_calls = Rc::clone(&blur_calls);
            fx.relay.set_handlers(
                Some(Rc::new(move |_| focus_calls.set(focus_calls.get() + 1))),
                Some(Rc::new(move |_| blur_calls.set(blur_calls.get() + 1))),
            );
        }

        // Inactive trap: caller still sees everything.
        fx.relay.handle_focus(&event());
        fx.relay.handle_blur(&event());
        assert_eq!(focus_calls.get(), 1);
        assert_eq!(blur_calls.get(), 1);

        fx.controller.on_activation();
        fx.relay.handle_focus(&event());
        fx.relay.handle_blur(&event());
        assert_eq!(focus_calls.get(), 2);
        assert_eq!(blur_calls.get(), 2);
    }

    #[test]
    fn caller_handler_runs_before_engine_channel() {
        let fx = fixture();
        fx.controller.on_activation();

        let engine_count_at_caller = Rc::new(Cell::new(usize::MAX));
        {
            let engine = Rc::clone(&fx.engine);
            let seen = Rc::clone(&engine_count_at_caller);
            fx.relay
                .set_handlers(Some(Rc::new(move |_| seen.set(engine.focus_seen.get()))), None);
        }

        fx.relay.handle_focus(&event());
        // Engine had not been called yet when the caller handler ran.
        assert_eq!(engine_count_at_caller.get(), 0);
        assert_eq!(fx.engine.focus_seen.get(), 1);
    }

    #[test]
    fn replacing_handlers_checks_identity() {
        let fx = fixture();
        let calls = Rc::new(Cell::new(0));
        let handler: RelayHandler = {
            let calls = Rc::clone(&calls);
            Rc::new(move |_| calls.set(calls.get() + 1))
        };

        fx.relay.set_handlers(Some(Rc::clone(&handler)), None);
        fx.relay.set_handlers(Some(handler), None);

        fx.relay.handle_focus(&event());
        assert_eq!(calls.get(), 1);
    }
}
