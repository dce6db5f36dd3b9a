#![forbid(unsafe_code)]

//! Core: focusable-node model, relay events, trap identity, and deferral.
//!
//! # Role in ftrap
//! `ftrap-core` is the primitive layer. It owns the node abstraction the
//! trap controller operates on, the event payloads flowing through the
//! focus/blur relay, trap-instance identity minting, and the microtask-style
//! task queue used for deferred focus restoration.
//!
//! # How it fits in the system
//! The controller (`ftrap`) composes these primitives into the trap
//! lifecycle state machine. The external focus engine is deliberately *not*
//! defined here: this crate knows nothing about tab order or containment,
//! only about node identity and deferred execution.

pub mod defer;
pub mod event;
pub mod identity;
pub mod node;

#[cfg(any(test, feature = "test-helpers"))]
pub mod probe;

pub use defer::TaskQueue;
pub use event::{RelayEvent, RelayHandler};
pub use identity::TrapId;
pub use node::{Focusable, FocusOptions, NodeRef, same_node};
